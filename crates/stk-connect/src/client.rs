//! Blocking Connect client over TCP

use std::io::{BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

use crate::codec::{Reply, Status};
use crate::{Command, ConnectError, Result};

/// Default Connect port of a local STK instance
pub const DEFAULT_PORT: u16 = 5001;

/// Default client timeouts (ms)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 600_000;

/// One Connect session to a running application
pub struct ConnectClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: SocketAddr,
}

impl ConnectClient {
    /// Open a session, trying each resolved address in turn.
    ///
    /// `io_timeout` bounds every subsequent read and write; a command that is not
    /// answered in time fails with [`ConnectError::Timeout`].
    pub fn connect(address: &str, connect_timeout: Duration, io_timeout: Duration) -> Result<Self> {
        let mut last_err = None;

        for addr in address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(io_timeout))?;
                    stream.set_write_timeout(Some(io_timeout))?;
                    stream.set_nodelay(true)?;

                    let writer = stream.try_clone()?;
                    info!("Connected to {}", addr);

                    return Ok(Self {
                        reader: BufReader::new(stream),
                        writer,
                        peer: addr,
                    });
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) => ConnectError::Io(e),
            None => ConnectError::InvalidArgument(format!("'{}' did not resolve", address)),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Send one command and wait for its reply. A `NAK` becomes [`ConnectError::Nack`].
    pub fn send(&mut self, command: &Command) -> Result<Vec<String>> {
        command.check()?;
        let line = command.to_string();
        debug!("-> {}", line);

        let timed_out = |e: std::io::Error| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => ConnectError::Timeout(line.clone()),
            _ => ConnectError::Io(e),
        };

        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .map_err(timed_out)?;
        self.writer.flush().map_err(timed_out)?;

        let reply = match Reply::read_from(&mut self.reader) {
            Ok(reply) => reply,
            Err(ConnectError::Io(e)) => return Err(timed_out(e)),
            Err(e) => return Err(e),
        };
        debug!("<- {:?} {} ({} lines)", reply.status, reply.kind, reply.lines.len());

        match reply.status {
            Status::Ack => Ok(reply.lines),
            Status::Nak => Err(ConnectError::nack(line, reply.lines.join("; "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::verbs;
    use std::io::{BufRead, BufReader as StdBufReader};
    use std::net::TcpListener;
    use std::thread;

    /// Single-connection server answering each line with a canned reply
    fn canned_server(replies: Vec<Reply>) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut reader = StdBufReader::new(stream);
            let mut received = Vec::new();

            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 {
                    break;
                }
                received.push(line.trim_end().to_string());
                reply.write_to(&mut writer).unwrap();
            }
            received
        });

        (addr, handle)
    }

    fn timeouts() -> (Duration, Duration) {
        (Duration::from_millis(500), Duration::from_millis(2_000))
    }

    #[test]
    fn test_send_ack_and_nak() {
        let (addr, server) = canned_server(vec![
            Reply::ack("GetSTKVersion", vec!["11.6.0".to_string()]),
            Reply::nak("Scenario already exists"),
        ]);
        let (ct, io) = timeouts();
        let mut client = ConnectClient::connect(&addr, ct, io).unwrap();

        let lines = client.send(&Command::new(verbs::GET_VERSION, "/")).unwrap();
        assert_eq!(lines, vec!["11.6.0"]);

        let err = client
            .send(&Command::new(verbs::NEW, "/").word("Scenario").word("S1"))
            .unwrap_err();
        match err {
            ConnectError::Nack { command, detail } => {
                assert_eq!(command, "New / Scenario S1");
                assert_eq!(detail, "Scenario already exists");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let received = server.join().unwrap();
        assert_eq!(received, vec!["GetSTKVersion /", "New / Scenario S1"]);
    }

    #[test]
    fn test_unanswered_command_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(600));
            drop(stream);
        });

        let mut client = ConnectClient::connect(
            &addr,
            Duration::from_millis(500),
            Duration::from_millis(100),
        )
        .unwrap();
        let err = client.send(&Command::new(verbs::GET_VERSION, "/")).unwrap_err();
        assert!(matches!(err, ConnectError::Timeout(_)), "got {:?}", err);

        server.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let (ct, io) = timeouts();
        assert!(ConnectClient::connect(&addr, ct, io).is_err());
    }

    #[test]
    fn test_invalid_command_not_sent() {
        let (addr, server) = canned_server(vec![]);
        let (ct, io) = timeouts();
        let mut client = ConnectClient::connect(&addr, ct, io).unwrap();

        let bad = Command::new(verbs::VO, "*/Satellite/S").text("quo\"te");
        assert!(matches!(client.send(&bad), Err(ConnectError::InvalidArgument(_))));

        drop(client);
        assert!(server.join().unwrap().is_empty());
    }
}
