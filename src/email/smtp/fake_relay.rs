//! src/email/smtp/fake_relay.rs
//!
//! Just enough of an SMTP server to accept (or refuse) one message per session.
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct Received {
    recipients: Vec<String>,
    messages: Vec<String>,
}

pub struct FakeRelay {
    pub port: u16,
    received: Arc<Mutex<Received>>,
}

impl FakeRelay {
    pub async fn start(reject_recipients: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake relay");
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Received::default()));

        let sessions = received.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, reject_recipients, sessions.clone()));
            }
        });

        Self { port, received }
    }

    pub fn messages(&self) -> Vec<String> {
        self.received.lock().unwrap().messages.clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.received.lock().unwrap().recipients.clone()
    }
}

async fn serve(stream: TcpStream, reject_recipients: bool, received: Arc<Mutex<Received>>) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    if writer.write_all(b"220 fake.relay ESMTP\r\n").await.is_err() {
        return;
    }

    let mut data: Option<String> = None;
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        if let Some(message) = data.as_mut() {
            if line == ".\r\n" {
                let message = data.take().unwrap_or_default();
                received.lock().unwrap().messages.push(message);
                if writer.write_all(b"250 2.0.0 Queued\r\n").await.is_err() {
                    return;
                }
            } else {
                message.push_str(&line);
            }
            continue;
        }

        let verb = line.get(..4).unwrap_or_default().to_ascii_uppercase();
        let reply: &[u8] = match verb.as_str() {
            "EHLO" | "HELO" => b"250 fake.relay\r\n",
            "RCPT" if reject_recipients => b"550 5.1.1 Recipient address rejected\r\n",
            "RCPT" => {
                let address = line
                    .trim_end()
                    .split_once('<')
                    .and_then(|(_, rest)| rest.split_once('>'))
                    .map(|(address, _)| address.to_string())
                    .unwrap_or_default();
                received.lock().unwrap().recipients.push(address);
                b"250 2.1.5 OK\r\n"
            }
            "DATA" => {
                data = Some(String::new());
                b"354 End data with <CR><LF>.<CR><LF>\r\n"
            }
            "QUIT" => {
                let _ = writer.write_all(b"221 2.0.0 Bye\r\n").await;
                return;
            }
            _ => b"250 2.0.0 OK\r\n",
        };

        if writer.write_all(reply).await.is_err() {
            return;
        }
    }
}
