use dres_domain::config::ServerConfig;
use dres_infrastructure::dns::transport::{read_frame, write_frame};
use dres_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

pub async fn start_dns_server(
    config: &ServerConfig,
    handler: DnsServerHandler,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = config.listen_address().parse()?;
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    info!(bind_address = %socket_addr, tcp = config.tcp_enabled, "Starting DNS server");

    let mut join_set: JoinSet<()> = JoinSet::new();

    let udp_socket = Arc::new(create_udp_socket(domain, socket_addr)?);
    let handler_udp = handler.clone();
    join_set.spawn(async move {
        run_udp_listener(udp_socket, handler_udp).await;
    });

    if config.tcp_enabled {
        let tcp_listener = create_tcp_listener(domain, socket_addr)?;
        let idle_timeout = config.tcp_idle_timeout();
        join_set.spawn(async move {
            run_tcp_listener(tcp_listener, handler, idle_timeout).await;
        });
    }

    info!("DNS server ready on {}", socket_addr);

    while join_set.join_next().await.is_some() {}
    Ok(())
}

async fn run_udp_listener(socket: Arc<UdpSocket>, handler: DnsServerHandler) {
    let mut recv_buf = [0u8; 4096];

    loop {
        let (n, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) => {
                // ICMP errors from earlier sends surface here on some platforms.
                debug!(error = %e, "UDP recv error");
                continue;
            }
        };

        let handler = handler.clone();
        let socket = socket.clone();
        let owned_buf: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw_udp(&owned_buf, from.ip()).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    debug!(client = %from, error = %e, "UDP send failed");
                }
            }
        });
    }
}

async fn run_tcp_listener(listener: TcpListener, handler: DnsServerHandler, idle: Duration) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    serve_tcp_connection(stream, peer, handler, idle).await;
                });
            }
            Err(e) => {
                error!(error = %e, "TCP accept error");
            }
        }
    }
}

/// One length-prefixed query after another until the client closes, goes
/// idle, or sends a query that gets no answer.
async fn serve_tcp_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: DnsServerHandler,
    idle: Duration,
) {
    loop {
        let query = match tokio::time::timeout(idle, read_frame(&mut stream)).await {
            Ok(Ok(Some(query))) => query,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP read error");
                break;
            }
            Err(_) => {
                debug!(client = %peer, "TCP connection idle, closing");
                break;
            }
        };

        let Some(response) = handler.handle_raw(&query, peer.ip()).await else {
            break;
        };

        if let Err(e) = write_frame(&mut stream, &response).await {
            debug!(client = %peer, error = %e, "TCP write error");
            break;
        }
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
