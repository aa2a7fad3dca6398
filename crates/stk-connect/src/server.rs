//! Connect server in front of a [`SimulatedStk`]
//!
//! Accepts any number of sessions; all of them drive the same simulated
//! application, like several Connect clients attached to one STK instance.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::codec::Reply;
use crate::sim::SimulatedStk;
use crate::{Command, Result};

pub struct ConnectServer {
    listener: TcpListener,
    stk: Arc<Mutex<SimulatedStk>>,
}

impl ConnectServer {
    /// Bind `address`, simulating an application that reports `version`
    pub async fn bind(address: &str, version: &str) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self {
            listener,
            stk: Arc::new(Mutex::new(SimulatedStk::new(version))),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle on the simulated application (for inspection)
    pub fn stk(&self) -> Arc<Mutex<SimulatedStk>> {
        Arc::clone(&self.stk)
    }

    /// Serve sessions until the task is dropped
    pub async fn run(self) -> Result<()> {
        info!("Connect simulator listening on {}", self.listener.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!("Session opened from {}", peer);

            let stk = Arc::clone(&self.stk);
            tokio::spawn(async move {
                match serve_session(stream, stk).await {
                    Ok(count) => info!("Session {} closed after {} commands", peer, count),
                    Err(e) => warn!("Session {} failed: {}", peer, e),
                }
            });
        }
    }
}

async fn serve_session(stream: TcpStream, stk: Arc<Mutex<SimulatedStk>>) -> Result<usize> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        count += 1;

        let reply = answer(&stk, &line);
        write_half.write_all(&reply.encode()?).await?;
        write_half.flush().await?;
    }

    Ok(count)
}

/// Reply to one command line
pub fn answer(stk: &Mutex<SimulatedStk>, line: &str) -> Reply {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => return Reply::nak(&e.to_string()),
    };
    debug!("<- {}", command);

    let result = stk
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .dispatch(&command);

    match result {
        Ok(lines) => Reply::ack(command.verb(), lines),
        Err(e) => {
            debug!("NAK {}: {}", command, e);
            Reply::nak(&e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Status;
    use crate::{Automation, ConnectClient, ConnectError, StkVersion};
    use std::time::Duration;

    #[test]
    fn test_answer_ack_and_nak() {
        let stk = Mutex::new(SimulatedStk::new("11.6.0"));

        let reply = answer(&stk, "GetSTKVersion /");
        assert_eq!(reply.status, Status::Ack);
        assert_eq!(reply.kind, "GetSTKVersion");
        assert_eq!(reply.lines, vec!["11.6.0"]);

        let reply = answer(&stk, "New / */Satellite Sat1");
        assert_eq!(reply.status, Status::Nak);
        assert!(reply.lines[0].contains("no scenario"));

        let reply = answer(&stk, "New / Scenario \"unterminated");
        assert_eq!(reply.status, Status::Nak);
    }

    #[tokio::test]
    async fn test_client_against_server() {
        let server = ConnectServer::bind("127.0.0.1:0", "12.2.0").await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let stk = server.stk();
        let task = tokio::spawn(server.run());

        let outcome = tokio::task::spawn_blocking(move || {
            let mut client = ConnectClient::connect(
                &addr,
                Duration::from_millis(500),
                Duration::from_secs(5),
            )?;
            let version = client.version()?;
            client.new_scenario("Remote")?;
            let rejected = client.propagate(&crate::ObjectPath::satellite("Missing"));
            Ok::<_, ConnectError>((version, rejected))
        })
        .await
        .unwrap();

        let (version, rejected) = outcome.unwrap();
        assert!(StkVersion(12).matches(&version));
        assert!(matches!(rejected, Err(ConnectError::Nack { .. })));
        assert_eq!(stk.lock().unwrap().scenario_name(), Some("Remote"));

        task.abort();
    }
}
