//! HTTP front end: the control page and `/cmd/<index>`.

use std::convert::Infallible;
use std::fmt::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use tokio::runtime::Runtime;

use irstrip_shared::{ButtonTable, CommandSender, ConsumerState};

pub struct Gateway {
    queue: CommandSender,
    buttons: Arc<ButtonTable>,
}

fn status(code: StatusCode) -> Response<Body> {
    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = code;
    resp
}

/// A command index is plain decimal digits within the command range
pub fn parse_index(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Decode `%XX` escapes in a path segment
fn percent_decode(s: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(s.len());
    let mut rest = s.as_bytes();

    while let Some((&b, tail)) = rest.split_first() {
        if b == b'%' {
            let hex = tail
                .get(..2)
                .filter(|h| h.iter().all(|b| b.is_ascii_hexdigit()))?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }

    String::from_utf8(bytes).ok()
}

impl Gateway {
    pub fn new(queue: CommandSender, buttons: Arc<ButtonTable>) -> Self {
        Gateway { queue, buttons }
    }

    pub fn handle(&self, req: &Request<Body>) -> Response<Body> {
        let path = req.uri().path();

        if path == "/" {
            return self.index();
        }

        if path == "/cmd" {
            return status(StatusCode::BAD_REQUEST);
        }

        match path.strip_prefix("/cmd/") {
            Some(index) => self.command(index),
            None => status(StatusCode::NOT_FOUND),
        }
    }

    fn command(&self, index: &str) -> Response<Body> {
        let cmd = match percent_decode(index).as_deref().and_then(parse_index) {
            Some(cmd) => cmd,
            None => {
                log::warn!("Rejected command index {:?}", index);
                return status(StatusCode::BAD_REQUEST);
            }
        };

        let label = self.buttons.get(cmd).map(|b| b.label.as_str()).unwrap_or("");
        log::info!("Command {} {}", cmd, label);

        if self.queue.status().get() == ConsumerState::Transmitting {
            log::debug!("Transmitter busy, command {} waits its turn", cmd);
        }

        match self.queue.submit(cmd) {
            Ok(()) => status(StatusCode::OK),
            Err(err) => {
                log::error!("{}", err);
                status(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }

    fn index(&self) -> Response<Body> {
        match render_page(&self.buttons) {
            Ok(page) => {
                let mut resp = Response::new(Body::from(page));
                resp.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                resp
            }
            Err(err) => {
                log::error!("Failed to render page: {}", err);
                status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>LED strip</title>
<style>
body { background: #222; font-family: sans-serif; margin: 0; }
.remote { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1em; max-width: 24em; margin: 2em auto; }
.remote a { display: block; height: 3em; line-height: 3em; border-radius: 1.5em; text-align: center;
            color: #fff; text-decoration: none; text-shadow: 0 0 3px #000; }
</style>
</head>
<body>
<div class="remote">
"#;

const TAIL: &str = r#"</div>
<script>
document.querySelectorAll('.remote a').forEach(function (a) {
    a.addEventListener('click', function (e) {
        e.preventDefault();
        fetch(a.getAttribute('href'));
    });
});
</script>
</body>
</html>
"#;

pub fn render_page(buttons: &ButtonTable) -> Result<String, fmt::Error> {
    let mut page = String::from(HEAD);

    for (cmd, button) in buttons.iter() {
        writeln!(
            page,
            r#"<a href="/cmd/{}" style="background: {}">{}</a>"#,
            cmd,
            button.color.css(),
            escape(&button.label)
        )?;
    }

    page.push_str(TAIL);
    Ok(page)
}

/// Bind `addr` and serve on `runtime`. Binding happens before returning so a
/// taken port fails startup.
pub fn spawn(runtime: &Runtime, addr: SocketAddr, gateway: Arc<Gateway>) -> anyhow::Result<()> {
    let builder = runtime
        .block_on(async { Server::try_bind(&addr) })
        .with_context(|| format!("Failed to listen on {}", addr))?;

    let make_svc = make_service_fn(move |_conn| {
        let gateway = gateway.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let resp = gateway.handle(&req);
                async move { Ok::<_, Infallible>(resp) }
            }))
        }
    });

    let server = builder.serve(make_svc);
    runtime.spawn(async move {
        if let Err(err) = server.await {
            log::error!("HTTP server failed: {}", err);
        }
    });

    Ok(())
}
