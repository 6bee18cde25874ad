//! In-process FTP server for tests. Speaks the command subset the client uses,
//! keeps files in memory and offers passive listeners on ephemeral ports.

use crate::config::ClientConfig;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
struct ServerState {
    files: HashMap<String, Vec<u8>>,
    commands: Vec<String>,
}

pub struct FakeServer {
    pub addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    pub async fn start() -> FakeServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(ServerState::default()));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(handle_connection(socket, Arc::clone(&shared)));
            }
        });

        FakeServer { addr, state }
    }

    pub async fn put(&self, name: &str, contents: &[u8]) {
        self.state
            .lock()
            .await
            .files
            .insert(name.to_string(), contents.to_vec());
    }

    pub async fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().await.files.get(name).cloned()
    }

    /// Every command line received so far, in order.
    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.commands.clone()
    }

    pub fn config(&self, local_dir: &Path) -> ClientConfig {
        ClientConfig {
            server_addr: self.addr.ip().to_string(),
            server_port: self.addr.port(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
            local_dir: local_dir.to_path_buf(),
            ..ClientConfig::default()
        }
    }
}

/// Binds a passive listener and formats its 227 reply.
pub async fn setup_pasv_listener(pasv_ip: Ipv4Addr) -> (TcpListener, String) {
    let listener = TcpListener::bind((IpAddr::V4(pasv_ip), 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ip_parts = pasv_ip.octets();
    let pasv_response = format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
        ip_parts[0],
        ip_parts[1],
        ip_parts[2],
        ip_parts[3],
        port / 256,
        port % 256
    );
    (listener, pasv_response)
}

async fn send(writer: &mut OwnedWriteHalf, message: &str) {
    let _ = writer.write_all(message.as_bytes()).await;
}

async fn handle_connection(socket: TcpStream, state: Arc<Mutex<ServerState>>) {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    send(&mut writer, "220-Welcome to the test server\r\n220 Ready.\r\n").await;

    let mut cwd = String::from("/");
    let mut pasv: Option<TcpListener> = None;

    while let Ok(Some(line)) = lines.next_line().await {
        state.lock().await.commands.push(line.clone());
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb.to_ascii_uppercase(), arg.to_string()),
            None => (line.to_ascii_uppercase(), String::new()),
        };

        match verb.as_str() {
            "USER" => send(&mut writer, "331 Password required.\r\n").await,
            "PASS" if arg == PASSWORD => {
                send(&mut writer, "230-Welcome, alice.\r\n230 Logged in.\r\n").await
            }
            "PASS" => send(&mut writer, "530 Login incorrect.\r\n").await,
            "TYPE" => send(&mut writer, "200 Type set to I.\r\n").await,
            "MODE" => send(&mut writer, "200 Mode set to S.\r\n").await,
            "PASV" => {
                let (listener, response) = setup_pasv_listener(Ipv4Addr::LOCALHOST).await;
                pasv = Some(listener);
                send(&mut writer, &response).await;
            }
            "PWD" => {
                let response = format!("257 \"{}\" is the current directory.\r\n", cwd);
                send(&mut writer, &response).await;
            }
            "CWD" if arg == "missing" => {
                send(&mut writer, "550 Failed to change directory.\r\n").await
            }
            "CWD" => {
                cwd = format!("{}{}/", cwd, arg);
                send(&mut writer, "250 Directory successfully changed.\r\n").await;
            }
            "CDUP" => {
                cwd = String::from("/");
                send(&mut writer, "250 Directory successfully changed.\r\n").await;
            }
            "MKD" => {
                let response = format!("257 \"{}{}\" created.\r\n", cwd, arg);
                send(&mut writer, &response).await;
            }
            "RMD" => send(&mut writer, "250 Directory removed.\r\n").await,
            "DELE" => {
                let removed = state.lock().await.files.remove(&arg).is_some();
                if removed {
                    send(&mut writer, "250 File deleted.\r\n").await;
                } else {
                    send(&mut writer, "550 File not found.\r\n").await;
                }
            }
            "SIZE" => {
                let size = state.lock().await.files.get(&arg).map(Vec::len);
                match size {
                    Some(size) => send(&mut writer, &format!("213 {}\r\n", size)).await,
                    None => send(&mut writer, "550 File not found.\r\n").await,
                }
            }
            "MDTM" => {
                let exists = state.lock().await.files.contains_key(&arg);
                if exists {
                    send(&mut writer, "213 20240102030405\r\n").await;
                } else {
                    send(&mut writer, "550 File not found.\r\n").await;
                }
            }
            "LIST" => {
                let Some(listener) = pasv.take() else {
                    send(&mut writer, "425 Use PASV first.\r\n").await;
                    continue;
                };
                let mut names: Vec<String> = state.lock().await.files.keys().cloned().collect();
                names.sort();
                send(&mut writer, "150 Here comes the directory listing.\r\n").await;
                let (mut data, _) = listener.accept().await.unwrap();
                for name in names {
                    let _ = data.write_all(format!("{}\r\n", name).as_bytes()).await;
                }
                drop(data);
                send(&mut writer, "226 Directory send OK.\r\n").await;
            }
            "RETR" => {
                let contents = state.lock().await.files.get(&arg).cloned();
                let (Some(listener), Some(contents)) = (pasv.take(), contents) else {
                    send(&mut writer, "550 File not found.\r\n").await;
                    continue;
                };
                send(&mut writer, "150 Opening BINARY mode data connection.\r\n").await;
                let (mut data, _) = listener.accept().await.unwrap();
                let _ = data.write_all(&contents).await;
                drop(data);
                send(&mut writer, "226 Transfer complete.\r\n").await;
            }
            "STOR" => {
                let Some(listener) = pasv.take() else {
                    send(&mut writer, "425 Use PASV first.\r\n").await;
                    continue;
                };
                send(&mut writer, "150 Ok to send data.\r\n").await;
                let (mut data, _) = listener.accept().await.unwrap();
                let mut contents = Vec::new();
                let _ = data.read_to_end(&mut contents).await;
                state.lock().await.files.insert(arg, contents);
                send(&mut writer, "226 Transfer complete.\r\n").await;
            }
            "QUIT" => {
                send(&mut writer, "221 Goodbye.\r\n").await;
                break;
            }
            _ => send(&mut writer, "502 Command not implemented.\r\n").await,
        }
    }
}
