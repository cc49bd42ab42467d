#![allow(dead_code)]

pub mod test_server {
    use std::sync::Once;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod contexts {
    use silodash::dispatcher::{DispatchError, ExecutionContext, Job};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;

    /// Designated context backed by one named OS thread.
    ///
    /// Units can check `thread::current().name()` to prove where they ran.
    pub struct ThreadContext {
        name: String,
        sender: Mutex<Option<mpsc::Sender<Job>>>,
    }

    impl ThreadContext {
        pub fn spawn(name: &str) -> Self {
            let (tx, rx) = mpsc::channel::<Job>();
            thread::Builder::new()
                .name(name.to_string())
                .spawn(move || {
                    for job in rx {
                        job();
                    }
                })
                .unwrap();
            Self {
                name: name.to_string(),
                sender: Mutex::new(Some(tx)),
            }
        }

        /// Stop accepting work.
        pub fn close(&self) {
            self.sender.lock().unwrap().take();
        }
    }

    impl ExecutionContext for ThreadContext {
        fn name(&self) -> &str {
            &self.name
        }

        fn execute(&self, job: Job) -> Result<(), DispatchError> {
            match self.sender.lock().unwrap().as_ref() {
                Some(tx) => tx.send(job).map_err(|_| DispatchError::ContextUnavailable),
                None => Err(DispatchError::ContextUnavailable),
            }
        }
    }
}

pub mod cluster {
    use silodash::cluster::{
        DashboardCounters, DashboardGrain, GrainError, GrainFactory, GrainTraceEntry,
        GrainTracing, ManagementGrain, Membership, SiloAddress, SiloGrain, SiloProperties,
        SiloRuntimeStatistics, SiloStatus,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    pub const ACTIVE_SILO: &str = "10.0.0.1:11111@1";
    pub const DEAD_SILO: &str = "10.0.0.2:11111@1";

    /// One grain call: method, argument and the thread it ran on.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub method: &'static str,
        pub arg: String,
        pub thread: Option<String>,
    }

    #[derive(Default)]
    struct State {
        calls: Mutex<Vec<Call>>,
        fail_with: Mutex<Option<GrainError>>,
        delay: Mutex<Option<Duration>>,
        withhold_statistics: AtomicBool,
    }

    /// Mock cluster that records every grain call.
    #[derive(Clone, Default)]
    pub struct RecordingCluster {
        state: Arc<State>,
    }

    impl RecordingCluster {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.calls.lock().unwrap().clone()
        }

        pub fn fail_with(&self, err: GrainError) {
            *self.state.fail_with.lock().unwrap() = Some(err);
        }

        pub fn delay(&self, d: Duration) {
            *self.state.delay.lock().unwrap() = Some(d);
        }

        /// Members stay active but `get_runtime_statistics` returns no rows.
        pub fn withhold_statistics(&self) {
            self.state.withhold_statistics.store(true, Ordering::SeqCst);
        }

        fn record(&self, method: &'static str, arg: &str) -> Result<(), GrainError> {
            self.state.calls.lock().unwrap().push(Call {
                method,
                arg: arg.to_string(),
                thread: thread::current().name().map(String::from),
            });
            let delay = *self.state.delay.lock().unwrap();
            if let Some(d) = delay {
                thread::sleep(d);
            }
            match self.state.fail_with.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl DashboardGrain for RecordingCluster {
        fn get_counters(&self) -> Result<DashboardCounters, GrainError> {
            self.record("get_counters", "")?;
            Ok(DashboardCounters {
                total_active_host_count: 1,
                total_active_grain_count: 42,
                ..Default::default()
            })
        }

        fn get_grain_tracing(&self, grain_type: &str) -> Result<GrainTracing, GrainError> {
            self.record("get_grain_tracing", grain_type)?;
            let mut tracing = GrainTracing::new();
            tracing.insert(
                "SayHello".to_string(),
                vec![GrainTraceEntry {
                    period_key: "2024-01-01T00:00:01".to_string(),
                    period: None,
                    silo_address: ACTIVE_SILO.parse().unwrap(),
                    grain: grain_type.to_string(),
                    method: "SayHello".to_string(),
                    count: 3,
                    exception_count: 0,
                    elapsed_time: 1.5,
                }],
            );
            Ok(tracing)
        }
    }

    impl ManagementGrain for RecordingCluster {
        fn get_hosts(&self, only_active: bool) -> Result<Membership, GrainError> {
            self.record("get_hosts", &only_active.to_string())?;
            let mut hosts = Membership::new();
            hosts.insert(ACTIVE_SILO.parse().unwrap(), SiloStatus::Active);
            if !only_active {
                hosts.insert(DEAD_SILO.parse().unwrap(), SiloStatus::Dead);
            }
            Ok(hosts)
        }

        fn get_runtime_statistics(
            &self,
            silos: &[SiloAddress],
        ) -> Result<Vec<SiloRuntimeStatistics>, GrainError> {
            let arg = silos
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.record("get_runtime_statistics", &arg)?;
            if self.state.withhold_statistics.load(Ordering::SeqCst) {
                return Ok(Vec::new());
            }
            Ok(silos
                .iter()
                .map(|_| SiloRuntimeStatistics {
                    activation_count: 7,
                    memory_usage: 1024,
                    ..Default::default()
                })
                .collect())
        }
    }

    struct RecordingSilo {
        cluster: RecordingCluster,
        silo: String,
    }

    impl SiloGrain for RecordingSilo {
        fn get_runtime_statistics(&self) -> Result<Vec<SiloRuntimeStatistics>, GrainError> {
            self.cluster.record("silo_runtime_statistics", &self.silo)?;
            Ok(vec![SiloRuntimeStatistics::default(); 3])
        }

        fn get_extended_properties(&self) -> Result<SiloProperties, GrainError> {
            self.cluster.record("silo_extended_properties", &self.silo)?;
            let mut props = SiloProperties::new();
            props.insert("HostName".to_string(), "box-1".to_string());
            Ok(props)
        }
    }

    impl GrainFactory for RecordingCluster {
        fn dashboard_grain(&self) -> Arc<dyn DashboardGrain> {
            Arc::new(self.clone())
        }

        fn management_grain(&self) -> Arc<dyn ManagementGrain> {
            Arc::new(self.clone())
        }

        fn silo_grain(&self, silo: &str) -> Arc<dyn SiloGrain> {
            Arc::new(RecordingSilo {
                cluster: self.clone(),
                silo: silo.to_string(),
            })
        }
    }
}

pub mod raw_http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Split a raw response into (status, content type, body).
    pub fn parse_response_parts(resp: &str) -> (u16, String, String) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let headers = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("").to_string();
        let mut status = 0;
        let mut content_type = String::new();
        for line in headers.lines() {
            if line.starts_with("HTTP/1.1") {
                status = line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("0")
                    .parse()
                    .unwrap();
            } else if let Some((name, val)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-type") {
                    content_type = val.trim().to_string();
                }
            }
        }
        (status, content_type, body)
    }
}
