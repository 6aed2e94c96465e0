use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

use dres_infrastructure::dns::transport::{read_frame, write_frame};
use dres_infrastructure::dns::wire;

pub const OVERSIZED_ANSWER_COUNT: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// Answer every question with the configured address.
    Answer,
    /// Reply over UDP with TC set and no answers; answer properly over TCP.
    Truncate,
    /// Answer with a different message id.
    WrongId,
    /// Receive and never reply.
    Silent,
    /// Answer with [`OVERSIZED_ANSWER_COUNT`] copies of the address, too
    /// large for a plain 512-byte UDP reply.
    Oversized,
}

/// Upstream DNS server on 127.0.0.1 with a random port, UDP and TCP.
/// Counts the queries it receives. Stops when dropped.
pub struct MockUpstream {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockUpstream {
    pub async fn start(answer: Ipv4Addr, mode: UpstreamMode) -> Self {
        let (udp, tcp) = bind_pair().await;
        let addr = udp.local_addr().unwrap();

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));

        let udp_counter = udp_queries.clone();
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = udp.recv_from(&mut buf).await else {
                    break;
                };
                udp_counter.fetch_add(1, Ordering::SeqCst);

                let reply = match mode {
                    UpstreamMode::Answer => build_response(&buf[..len], answer, 1, false, 0),
                    UpstreamMode::Truncate => build_response(&buf[..len], answer, 1, true, 0),
                    UpstreamMode::WrongId => build_response(&buf[..len], answer, 1, false, 1),
                    UpstreamMode::Oversized => build_response(
                        &buf[..len],
                        answer,
                        OVERSIZED_ANSWER_COUNT,
                        false,
                        0,
                    ),
                    UpstreamMode::Silent => None,
                };

                if let Some(reply) = reply {
                    let _ = udp.send_to(&reply, peer).await;
                }
            }
        });

        let tcp_counter = tcp_queries.clone();
        let tcp_task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = tcp.accept().await {
                let counter = tcp_counter.clone();
                tokio::spawn(async move {
                    while let Ok(Some(query)) = read_frame(&mut stream).await {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let copies = match mode {
                            UpstreamMode::Oversized => OVERSIZED_ANSWER_COUNT,
                            _ => 1,
                        };
                        let Some(reply) = build_response(&query, answer, copies, false, 0) else {
                            break;
                        };
                        if write_frame(&mut stream, &reply).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        Self {
            addr,
            udp_queries,
            tcp_queries,
            tasks: vec![udp_task, tcp_task],
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    pub fn total_queries(&self) -> usize {
        self.udp_queries() + self.tcp_queries()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn bind_pair() -> (UdpSocket, TcpListener) {
    for _ in 0..20 {
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        if let Ok(tcp) = TcpListener::bind(addr).await {
            return (udp, tcp);
        }
    }
    panic!("could not bind UDP and TCP on the same port");
}

fn build_response(
    query: &[u8],
    answer: Ipv4Addr,
    copies: usize,
    truncated: bool,
    id_offset: u16,
) -> Option<Vec<u8>> {
    let query = Message::from_vec(query).ok()?;

    let mut response = Message::new(
        query.id().wrapping_add(id_offset),
        MessageType::Response,
        OpCode::Query,
    );
    response.set_recursion_desired(query.recursion_desired());
    response.set_recursion_available(true);
    response.set_truncated(truncated);

    for question in query.queries() {
        response.add_query(question.clone());
        if !truncated {
            for _ in 0..copies {
                response.add_answer(Record::from_rdata(
                    question.name().clone(),
                    60,
                    RData::A(A(answer)),
                ));
            }
        }
    }

    wire::encode(&response).ok()
}
