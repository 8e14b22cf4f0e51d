#![allow(dead_code)]

pub mod fixtures {
    use std::sync::{Arc, Mutex};

    use apigate::{ApiOptions, Dispatcher, ResponseFormat, Route, RouteGroup};

    /// Shared record of what ran, in order.
    pub type CallLog = Arc<Mutex<Vec<String>>>;

    pub fn call_log() -> CallLog {
        Arc::default()
    }

    pub fn entries(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    pub fn options(format: ResponseFormat) -> ApiOptions {
        ApiOptions::new().with_response_type(format)
    }

    pub fn dispatcher(options: ApiOptions) -> Dispatcher {
        Dispatcher::new(Arc::new(options))
    }

    /// A group with one GET route that logs `handler:<group>` and answers
    /// with `{"group": <group>, "params": {...}}`.
    pub fn recording_group(group: &'static str, pattern: &str, log: &CallLog) -> RouteGroup {
        let log = Arc::clone(log);
        let route = Route::get(group, pattern, move |req, res| {
            log.lock().unwrap().push(format!("handler:{group}"));
            let params: serde_json::Map<String, serde_json::Value> = req
                .route_params()
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone().into()))
                .collect();
            res.set_payload(serde_json::json!({ "group": group, "params": params }));
            Ok(())
        })
        .unwrap();
        RouteGroup::new(group).with_route(route)
    }
}

pub mod hooks {
    use apigate::router::ParamVec;
    use apigate::{ApiRequest, ApiResponse, Middleware};

    use super::fixtures::CallLog;

    /// Logs `before:<label>` / `after:<label>`.
    pub struct Recorder {
        pub label: &'static str,
        pub log: CallLog,
    }

    impl Middleware for Recorder {
        fn before(&self, _p: &ParamVec, _req: &ApiRequest, _res: &mut ApiResponse) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("before:{}", self.label));
            Ok(())
        }

        fn after(&self, _p: &ParamVec, _req: &ApiRequest, _res: &mut ApiResponse) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("after:{}", self.label));
            Ok(())
        }
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    pub struct RawResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    pub fn send_request(addr: &SocketAddr, req: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
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

    pub fn parse_response(resp: &str) -> RawResponse {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        RawResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }

    /// Send a request with `Connection: close` and parse the answer.
    pub fn call(addr: &SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: &str) -> RawResponse {
        call_bytes(addr, method, path, headers, body.as_bytes())
    }

    /// Like [`call`], for bodies that are not text.
    pub fn call_bytes(
        addr: &SocketAddr,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> RawResponse {
        let mut head = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        for (k, v) in headers {
            head.push_str(&format!("{k}: {v}\r\n"));
        }
        if !body.is_empty() {
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        head.push_str("\r\n");
        let mut req = head.into_bytes();
        req.extend_from_slice(body);
        parse_response(&send_request(addr, &req))
    }
}
