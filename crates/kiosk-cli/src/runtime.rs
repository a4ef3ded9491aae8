// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use kiosk_app::{FailedLoad, FeedRequest, Loaded, WallClock};
use kiosk_feed::Client;
use kiosk_testkit::BoardFaker;
use kiosk_tui::{DataRuntime, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::debug;

/// Loads over HTTP, one short-lived thread per request so a slow endpoint
/// never stalls the panel.
pub struct FeedRuntime {
    client: Client,
}

impl FeedRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataRuntime for FeedRuntime {
    fn load(&mut self, request: FeedRequest) -> Result<Loaded, FailedLoad> {
        self.client.load(request)
    }

    fn spawn_load(&mut self, request: FeedRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("load-{}", request.kind()))
            .spawn(move || {
                let result = client.load(request);
                if tx.send(InternalEvent::Loaded(result)).is_err() {
                    debug!(feed = %request.kind(), "panel closed before load finished");
                }
            })
            .with_context(|| format!("spawn {} loader thread", request.kind()))?;
        Ok(())
    }
}

/// Serves generated fixtures for `--demo`.
pub struct DemoRuntime {
    faker: BoardFaker,
    clock: WallClock,
}

impl DemoRuntime {
    pub fn new(seed: u64, clock: WallClock) -> Self {
        Self {
            faker: BoardFaker::new(seed),
            clock,
        }
    }
}

impl DataRuntime for DemoRuntime {
    fn load(&mut self, request: FeedRequest) -> Result<Loaded, FailedLoad> {
        Ok(self.faker.loaded(request, self.clock.minute_of_day()))
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, FeedRuntime};
    use anyhow::{Result, anyhow};
    use kiosk_app::{FeedKind, FeedRequest, LinesPerPage, Loaded, WallClock};
    use kiosk_feed::Client;
    use kiosk_tui::{DataRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Response, Server};

    #[test]
    fn feed_runtime_delivers_results_from_a_worker_thread() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/api/news");
            request
                .respond(Response::from_string(r#"{"news":["a","b","c"]}"#))
                .expect("response should succeed");
        });

        let mut runtime = FeedRuntime::new(Client::new(&addr, Duration::from_secs(1))?);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_load(FeedRequest::News, tx)?;

        let InternalEvent::Loaded(result) = rx.recv_timeout(Duration::from_secs(5))?;
        let loaded = result.map_err(|failed| anyhow!("{failed}"))?;
        assert_eq!(loaded.kind(), FeedKind::News);
        assert_eq!(loaded.item_count(), 3);

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn demo_runtime_answers_every_feed() -> Result<()> {
        let mut runtime = DemoRuntime::new(42, WallClock::detect());
        for request in [
            FeedRequest::Status {
                max_lines: LinesPerPage::default(),
            },
            FeedRequest::Weather,
            FeedRequest::News,
            FeedRequest::Schedule,
        ] {
            let loaded = runtime.load(request).map_err(|failed| anyhow!("{failed}"))?;
            assert_eq!(loaded.kind(), request.kind());
            assert!(loaded.item_count() > 0);
        }

        let Loaded::Status(status) = runtime
            .load(FeedRequest::Status {
                max_lines: LinesPerPage::default(),
            })
            .map_err(|failed| anyhow!("{failed}"))?
        else {
            return Err(anyhow!("status request returned another feed"));
        };
        assert!(status.page_count(LinesPerPage::default()) > 1);
        Ok(())
    }
}
