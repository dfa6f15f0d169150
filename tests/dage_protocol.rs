//! S6 — line protocol round trip over a real socket.

use bulkcache::{Container, EngineKind};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn send(stream: &mut TcpStream, line: &str) -> String {
    stream.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    reader.read_line(&mut response).await.unwrap();
    response.trim_end().to_string()
}

#[tokio::test]
async fn set_then_get_then_expire_over_the_wire() {
    let container = Container::new("dage-wire", EngineKind::Ordered);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serving_container = container.clone();
    tokio::spawn(async move {
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            let c = serving_container.clone();
            tokio::spawn(async move {
                let (reader, mut writer) = socket.into_split();
                let mut lines = BufReader::new(reader).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let cmd: Vec<&str> = line.split('\t').collect();
                    match bulkcache::dage::handle_command(&c, &cmd) {
                        Some(bulkcache::dage::Outcome::Reply(text)) => {
                            writer.write_all(format!("{text}\n").as_bytes()).await.unwrap();
                        }
                        Some(bulkcache::dage::Outcome::Quit) => {
                            writer.write_all(b"Good luck!\n").await.unwrap();
                            return;
                        }
                        None => {}
                    }
                }
            });
        }
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let set_reply = send(&mut stream, "Set\tb\tk\thello\t5").await;
    assert_eq!(set_reply, "Success");

    let get_reply = send(&mut stream, "Get\tb").await;
    assert_eq!(get_reply, "hello");

    tokio::time::sleep(std::time::Duration::from_secs(6)).await;
    let get_reply = send(&mut stream, "Get\tb").await;
    assert_eq!(get_reply, "");

    container.shutdown();
}
