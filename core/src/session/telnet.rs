//! Plain telnet CLI sessions.
//!
//! Covers the common lab and out-of-band setup: a device (or a console
//! server) exposing its CLI over TCP with a username/password login and an
//! optional `enable` secret.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use switchtrace_common::config::Config;
use switchtrace_common::error::SessionError;
use switchtrace_common::model::DeviceDescriptor;
use switchtrace_protocols::telnet::{self, TelnetDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{DeviceSession, SessionFactory};

const READ_BUFFER_SIZE: usize = 4096;

static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._\-()/:@]+[>#]$").unwrap());

const USERNAME_PROMPTS: [&str; 2] = ["username:", "login:"];
const PASSWORD_PROMPT: &str = "password:";
const LOGIN_REJECTED: [&str; 3] = ["login invalid", "authentication failed", "access denied"];

fn last_line(text: &str) -> &str {
    text.trim_end().lines().last().unwrap_or("").trim()
}

fn at_prompt(text: &str) -> bool {
    PROMPT.is_match(last_line(text))
}

fn prompts_seen(text: &str) -> usize {
    text.lines().filter(|l| PROMPT.is_match(l.trim())).count()
}

fn asks_for(text: &str, prompts: &[&str]) -> bool {
    let last = last_line(text).to_ascii_lowercase();
    prompts.iter().any(|p| last.ends_with(p))
}

/// Removes the echoed command and the trailing prompt from a command's output.
fn clean_output(raw: &str, command: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    if lines.first().is_some_and(|l| l.trim().ends_with(command.trim())) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| PROMPT.is_match(l.trim())) {
        lines.pop();
    }

    lines.join("\n")
}

pub struct TelnetSessionFactory {
    connect_timeout: Duration,
    login_timeout: Duration,
}

impl TelnetSessionFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            login_timeout: config.command_timeout,
        }
    }
}

#[async_trait]
impl SessionFactory for TelnetSessionFactory {
    async fn open(&self, device: &DeviceDescriptor) -> Result<Box<dyn DeviceSession>, SessionError> {
        let unreachable = |reason: String| SessionError::Connection {
            device: device.name.clone(),
            reason,
        };

        let stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((device.address.as_str(), device.port)),
        )
        .await
        .map_err(|_| SessionError::Timeout {
            device: device.name.clone(),
            seconds: self.connect_timeout.as_secs(),
        })?
        .map_err(|e| unreachable(e.to_string()))?;

        let mut session = TelnetSession::new(&device.name, stream, self.login_timeout);
        if let Err(e) = session.login(device, self.login_timeout).await {
            session.close().await;
            return Err(e);
        }
        session.prepare(device, self.login_timeout).await;

        Ok(Box::new(session))
    }
}

/// Text read from the device, and whether the wait condition was met.
struct Reply {
    text: String,
    complete: bool,
}

pub struct TelnetSession {
    device: String,
    stream: Option<TcpStream>,
    decoder: TelnetDecoder,
    resync_budget: Duration,
    /// Set when the session could not get back to a prompt after a command
    /// ran out of time. Output can no longer be matched to commands.
    poisoned: bool,
}

impl TelnetSession {
    fn new(device: &str, stream: TcpStream, resync_budget: Duration) -> Self {
        Self {
            device: device.to_string(),
            stream: Some(stream),
            decoder: TelnetDecoder::new(),
            resync_budget,
            poisoned: false,
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        let stream = self.stream.as_mut().ok_or(SessionError::Closed)?;
        let mut bytes = telnet::encode(line.as_bytes());
        bytes.extend_from_slice(b"\r\n");
        stream.write_all(&bytes).await?;
        Ok(())
    }

    /// Reads until `done` accepts the accumulated text, the peer closes, or
    /// `budget` runs out. Whatever arrived is returned in every case.
    async fn read_until(
        &mut self,
        budget: Duration,
        done: impl Fn(&str) -> bool,
    ) -> Result<Reply, SessionError> {
        let deadline = Instant::now() + budget;
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let mut bytes = Vec::new();
        let mut complete = done("");

        while !complete {
            let stream = self.stream.as_mut().ok_or(SessionError::Closed)?;
            match tokio::time::timeout_at(deadline, stream.read(&mut buf)).await {
                Err(_) => {
                    debug!(device = %self.device, "read budget spent, using partial output");
                    break;
                }
                Ok(Ok(0)) => {
                    debug!(device = %self.device, "peer closed the connection");
                    self.stream = None;
                    break;
                }
                Ok(Ok(n)) => {
                    let decoded = self.decoder.feed(&buf[..n]);
                    if !decoded.replies.is_empty() {
                        stream.write_all(&decoded.replies).await?;
                    }
                    bytes.extend(decoded.data.iter().filter(|&&b| b != b'\r'));
                    complete = done(&String::from_utf8_lossy(&bytes));
                }
                Ok(Err(e)) => return Err(e.into()),
            }
        }

        Ok(Reply {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            complete,
        })
    }

    /// Drains the rest of a reply that outlived its budget.
    ///
    /// The late command still owes its prompt, and the empty line sent here
    /// earns a second one. Everything up to that second prompt is dropped.
    async fn resync(&mut self) {
        let settled = async {
            self.send_line("").await?;
            self.read_until(self.resync_budget, |t| prompts_seen(t) >= 2).await
        }
        .await;

        match settled {
            Ok(reply) if reply.complete => {
                debug!(device = %self.device, dropped = reply.text.len(), "back at the prompt");
            }
            Ok(_) => {
                warn!(device = %self.device, "no prompt after a late reply, giving up on the session");
                self.poisoned = true;
            }
            Err(e) => {
                warn!(device = %self.device, error = %e, "resync failed, giving up on the session");
                self.poisoned = true;
            }
        }
    }

    async fn login(&mut self, device: &DeviceDescriptor, budget: Duration) -> Result<(), SessionError> {
        let rejected = || SessionError::Authentication(device.name.clone());
        let waiting_for_login = |t: &str| {
            at_prompt(t) || asks_for(t, &USERNAME_PROMPTS) || asks_for(t, &[PASSWORD_PROMPT])
        };

        let mut text = self.read_until(budget, waiting_for_login).await?.text;

        if asks_for(&text, &USERNAME_PROMPTS) {
            self.send_line(&device.credentials.username).await?;
            text = self.read_until(budget, waiting_for_login).await?.text;
        }

        if asks_for(&text, &[PASSWORD_PROMPT]) {
            self.send_line(&device.credentials.password).await?;
            text = self.read_until(budget, waiting_for_login).await?.text;
        }

        let lower = text.to_ascii_lowercase();
        if LOGIN_REJECTED.iter().any(|m| lower.contains(m)) || !at_prompt(&text) {
            return Err(rejected());
        }

        Ok(())
    }

    /// Enters privileged mode when a secret is configured and disables paging.
    /// Neither step is fatal; an unprivileged session can still answer most
    /// lookups.
    async fn prepare(&mut self, device: &DeviceDescriptor, budget: Duration) {
        if let Some(secret) = &device.secret {
            let escalated = async {
                self.send_line("enable").await?;
                let text = self
                    .read_until(budget, |t| at_prompt(t) || asks_for(t, &[PASSWORD_PROMPT]))
                    .await?
                    .text;
                if asks_for(&text, &[PASSWORD_PROMPT]) {
                    self.send_line(secret).await?;
                    Ok(self.read_until(budget, at_prompt).await?.text)
                } else {
                    Ok::<_, SessionError>(text)
                }
            }
            .await;

            match escalated {
                Ok(text) if last_line(&text).ends_with('#') => {}
                Ok(_) => warn!(device = %device.name, "enable secret rejected, staying unprivileged"),
                Err(e) => warn!(device = %device.name, error = %e, "enable failed"),
            }
        }

        if let Err(e) = self.execute("terminal length 0", budget).await {
            debug!(device = %device.name, error = %e, "could not disable paging");
        }
    }
}

#[async_trait]
impl DeviceSession for TelnetSession {
    async fn execute(&mut self, command: &str, timeout: Duration) -> Result<String, SessionError> {
        if self.poisoned {
            return Err(SessionError::Desynchronized(self.device.clone()));
        }

        self.send_line(command).await.map_err(|e| SessionError::Command {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
        let reply = self.read_until(timeout, at_prompt).await?;
        if !reply.complete && self.stream.is_some() {
            self.resync().await;
        }
        Ok(clean_output(&reply.text, command))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.write_all(b"exit\r\n").await;
            let _ = stream.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    #[test]
    fn prompt_detection() {
        assert!(at_prompt("\nSW1#"));
        assert!(at_prompt("banner\nSW-CORE>"));
        assert!(at_prompt("switch(config)#  "));
        assert!(!at_prompt("Password:"));
        assert!(!at_prompt(" 10  001b.2b3c.4d5e  DYNAMIC  Gi1/0/5"));
    }

    #[test]
    fn clean_output_strips_echo_and_prompt() {
        let raw = "show ip arp 10.1.1.5\nInternet  10.1.1.5  3  001b.2b3c.4d5e  ARPA  Vlan10\nSW1#";
        assert_eq!(
            clean_output(raw, "show ip arp 10.1.1.5"),
            "Internet  10.1.1.5  3  001b.2b3c.4d5e  ARPA  Vlan10"
        );
    }

    /// A tiny fake device: asks for credentials, then answers commands.
    ///
    /// `show mac address-table` answers in two parts with a pause between
    /// them, `show tech-support` never answers.
    async fn fake_device(listener: TcpListener, password: &'static str) {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"\r\nUser Access Verification\r\n\r\nUsername: ").await.unwrap();
        let _user = lines.next_line().await.unwrap();
        write.write_all(b"Password: ").await.unwrap();
        let pass = lines.next_line().await.unwrap().unwrap_or_default();
        if pass.trim() != password {
            write.write_all(b"\r\n% Login invalid\r\n\r\nUsername: ").await.unwrap();
            return;
        }
        write.write_all(b"\r\nSW1#").await.unwrap();

        while let Ok(Some(line)) = lines.next_line().await {
            let command = line.trim().to_string();
            let reply = match command.as_str() {
                "show ip arp 10.1.1.5" => format!(
                    "{command}\r\nInternet  10.1.1.5  3  001b.2b3c.4d5e  ARPA  Vlan10\r\nSW1#"
                ),
                "show mac address-table" => {
                    let head = format!("{command}\r\nVlan    Mac Address       Type        Ports\r\n");
                    write.write_all(head.as_bytes()).await.unwrap();
                    tokio::time::sleep(Duration::from_millis(800)).await;
                    "  10    aaaa.bbbb.cccc    DYNAMIC     Gi1/0/1\r\nSW1#".to_string()
                }
                "show interfaces description" => {
                    let reply = format!("{command}\r\nGi1/0/1  up  up  Café\r\nSW1#");
                    // Cut between the two bytes of the 'é'.
                    let (head, tail) = reply.as_bytes().split_at(reply.find('é').unwrap() + 1);
                    write.write_all(head).await.unwrap();
                    write.flush().await.unwrap();
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    write.write_all(tail).await.unwrap();
                    continue;
                }
                "show tech-support" => std::future::pending().await,
                "exit" => return,
                _ => format!("{command}\r\nSW1#"),
            };
            write.write_all(reply.as_bytes()).await.unwrap();
        }
    }

    fn device_at(port: u16, password: &str) -> DeviceDescriptor {
        let mut device = DeviceDescriptor::new("SW1", "127.0.0.1", "admin", password);
        device.port = port;
        device
    }

    fn quick_config() -> Config {
        Config {
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_secs(2),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn logs_in_and_runs_commands() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(fake_device(listener, "cisco"));

        let factory = TelnetSessionFactory::new(&quick_config());
        let mut session = factory.open(&device_at(port, "cisco")).await.unwrap();
        let output = session
            .execute("show ip arp 10.1.1.5", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(output, "Internet  10.1.1.5  3  001b.2b3c.4d5e  ARPA  Vlan10");
        session.close().await;
        session.close().await;
    }

    #[tokio::test]
    async fn rejected_login_is_an_authentication_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(fake_device(listener, "cisco"));

        let factory = TelnetSessionFactory::new(&quick_config());
        let result = factory.open(&device_at(port, "wrong")).await;
        assert!(matches!(result, Err(SessionError::Authentication(_))));
    }

    #[tokio::test]
    async fn late_reply_is_drained_before_next_command() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(fake_device(listener, "cisco"));

        let factory = TelnetSessionFactory::new(&quick_config());
        let mut session = factory.open(&device_at(port, "cisco")).await.unwrap();

        let partial = session
            .execute("show mac address-table", Duration::from_millis(300))
            .await
            .unwrap();
        assert!(partial.contains("Mac Address"));
        assert!(!partial.contains("aaaa.bbbb.cccc"));

        let output = session
            .execute("show ip arp 10.1.1.5", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(output, "Internet  10.1.1.5  3  001b.2b3c.4d5e  ARPA  Vlan10");
        session.close().await;
    }

    #[tokio::test]
    async fn silent_device_fails_later_commands() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(fake_device(listener, "cisco"));

        let config = Config {
            command_timeout: Duration::from_millis(500),
            ..quick_config()
        };
        let factory = TelnetSessionFactory::new(&config);
        let mut session = factory.open(&device_at(port, "cisco")).await.unwrap();

        let output = session
            .execute("show tech-support", Duration::from_millis(200))
            .await
            .unwrap();
        assert!(!output.contains("SW1#"));

        let next = session
            .execute("show ip arp 10.1.1.5", Duration::from_secs(2))
            .await;
        assert!(matches!(next, Err(SessionError::Desynchronized(_))));
        session.close().await;
    }

    #[tokio::test]
    async fn character_split_across_reads_is_kept() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(fake_device(listener, "cisco"));

        let factory = TelnetSessionFactory::new(&quick_config());
        let mut session = factory.open(&device_at(port, "cisco")).await.unwrap();
        let output = session
            .execute("show interfaces description", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(output, "Gi1/0/1  up  up  Café");
        session.close().await;
    }
}
