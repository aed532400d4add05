// Listener module
// Creates the TCP listener through socket2 so bind failures can be explained

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::StartupError;

/// Pending connection queue length
const BACKLOG: i32 = 128;

/// Create a non-blocking `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is set on unix so a restart does not trip over sockets
/// still in `TIME_WAIT`. Bind failures carry a hint for the operator.
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    socket.set_nonblocking(true)?;

    socket
        .bind(&addr.into())
        .and_then(|()| socket.listen(BACKLOG))
        .map_err(|source| StartupError::Bind {
            addr,
            hint: bind_hint(&source, addr),
            source,
        })?;

    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}

fn bind_hint(err: &io::Error, addr: SocketAddr) -> String {
    match err.kind() {
        io::ErrorKind::AddrInUse => format!(
            "Port {} is already in use. Stop the other process or choose another port \
             with the PORT environment variable or server.port.",
            addr.port()
        ),
        io::ErrorKind::PermissionDenied => format!(
            "Binding port {} needs elevated privileges. Run with sufficient privileges \
             or use a port above 1024.",
            addr.port()
        ),
        io::ErrorKind::AddrNotAvailable => format!(
            "Address {} is not available on this host. Check server.host.",
            addr.ip()
        ),
        _ => "Check server.host and server.port.".to_string(),
    }
}
