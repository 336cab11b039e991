use super::*;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::mpsc::channel;
use std::thread;

#[test]
fn forwards_a_received_datagram_to_the_sink() {
    let bind_addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    let socket = UdpSocket::bind(bind_addr).unwrap();
    let local_addr = socket.local_addr().unwrap();
    drop(socket);

    let (tx, rx) = channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let listener_cancelled = Arc::clone(&cancelled);

    let handle = thread::spawn(move || listen(local_addr, 1500, tx, &listener_cancelled));

    // give the listener time to bind before sending
    thread::sleep(Duration::from_millis(100));
    let sender = UdpSocket::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0)).unwrap();
    sender.send_to(b"hello ipfix", local_addr).unwrap();

    let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(received, b"hello ipfix");

    // dropping rx causes the next `sink.send` to fail and the loop to exit
    drop(rx);
    let _ = handle.join();
}
