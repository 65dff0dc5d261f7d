use std::{net::SocketAddr, thread, thread::JoinHandle};

use issuemock::IssueMockServerBuilder;
use tokio::sync::oneshot;

/// A mock server running on its own runtime thread, bound to an ephemeral port.
/// Dropping it stops the accept loop and waits for the thread to finish.
pub struct TestServer {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> TestServer {
        let _ = env_logger::builder().is_test(true).try_init();

        let (addr_sender, addr_receiver) = oneshot::channel::<SocketAddr>();
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();

        let thread = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Cannot build local tokio runtime");

            let server = IssueMockServerBuilder::new()
                .print_access_log(true)
                .build()
                .expect("cannot build mock server");

            runtime
                .block_on(server.start_with_signals(Some(addr_sender), async {
                    let _ = shutdown_receiver.await;
                }))
                .expect("mock server failed");
        });

        let address = addr_receiver
            .blocking_recv()
            .expect("mock server did not publish its address");

        TestServer {
            address,
            shutdown: Some(shutdown_sender),
            thread: Some(thread),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
