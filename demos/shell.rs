//! End-to-end demo wiring both bridge ends in one process.
//!
//! The platform seams (surface, native affordances, page DOM) are in-memory
//! stand-ins: injected scripts are parsed for their dispatch payloads and fed
//! straight into a [`ContentRuntime`], and everything the runtime posts flows
//! back into [`Shell::on_message`]. Run with:
//!
//! ```sh
//! cargo run --example shell
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use parking_lot::Mutex;
use tracing::info;
use url::Url;

use webview_shell::{
    AffordanceAction, ChannelPort, ContentRuntime, ContentSurface, Envelope, MessageKind,
    MessagePort, NativeHost, PageDom, Shell, Theme,
};

// ============================================================================
// In-Memory Page
// ============================================================================

/// Page document stand-in with a drawer flag and an affordance slot.
#[derive(Default)]
struct DemoDom {
    drawer_open: Mutex<bool>,
    affordance: Mutex<Option<AffordanceAction>>,
    reloads: AtomicUsize,
}

impl PageDom for DemoDom {
    fn is_drawer_open(&self) -> webview_shell::Result<bool> {
        Ok(*self.drawer_open.lock())
    }

    fn activate_drawer_toggle(&self) -> webview_shell::Result<()> {
        let mut open = self.drawer_open.lock();
        *open = !*open;
        info!(open = *open, "[page] drawer toggled");
        Ok(())
    }

    fn has_refresh_affordance(&self) -> webview_shell::Result<bool> {
        Ok(self.affordance.lock().is_some())
    }

    fn insert_refresh_affordance(
        &self,
        on_activate: AffordanceAction,
    ) -> webview_shell::Result<()> {
        info!("[page] refresh affordance inserted");
        *self.affordance.lock() = Some(on_activate);
        Ok(())
    }

    fn append_stylesheet(&self, href: &str) -> webview_shell::Result<()> {
        info!(href, "[page] stylesheet appended");
        Ok(())
    }

    fn location(&self) -> webview_shell::Result<Url> {
        Ok(Url::parse("https://chat.openai.com/chat")?)
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// In-Memory Surface
// ============================================================================

/// Surface stand-in forwarding dispatch payloads into the content runtime.
struct DemoSurface {
    runtime: Mutex<Option<Arc<ContentRuntime>>>,
    reloads: AtomicUsize,
}

impl DemoSurface {
    fn new() -> Self {
        Self {
            runtime: Mutex::new(None),
            reloads: AtomicUsize::new(0),
        }
    }

    fn attach(&self, runtime: Arc<ContentRuntime>) {
        *self.runtime.lock() = Some(runtime);
    }

    /// Extracts every `dispatch(...)` payload from an injected script.
    fn dispatch_payloads(script: &str) -> Vec<&str> {
        let mut payloads = Vec::new();
        let mut rest = script;
        while let Some(at) = rest.find("dispatch(") {
            rest = &rest[at + "dispatch(".len()..];
            if let Some(end) = rest.find(") }") {
                payloads.push(&rest[..end]);
            }
        }
        payloads
    }
}

impl ContentSurface for DemoSurface {
    fn load(&self, destination: &Url, _bootstrap: &str) {
        info!(destination = %destination, "[surface] loading destination");
    }

    fn inject_script(&self, script: &str) {
        let runtime = self.runtime.lock();
        let Some(runtime) = runtime.as_ref() else {
            return;
        };
        for payload in Self::dispatch_payloads(script) {
            runtime.dispatch(payload);
        }
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        info!("[surface] reloading");
    }

    fn request_focus(&self) {
        info!("[surface] focus requested");
    }

    fn set_user_agent(&self, user_agent: &str) {
        info!(user_agent, "[surface] client identity set");
    }
}

// ============================================================================
// In-Memory Native Host
// ============================================================================

struct DemoNative;

impl NativeHost for DemoNative {
    fn set_chrome_color(&self, color: &str) {
        info!(color, "[native] chrome color");
    }

    fn exit_app(&self) {
        info!("[native] exit requested");
    }

    fn focus_keyboard_proxy(&self) {}

    fn blur_keyboard_proxy(&self) {
        info!("[native] keyboard dismissed");
    }
}

// ============================================================================
// Demo
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,webview_shell=debug".into()),
        )
        .init();

    // Development bundle with placeholder assets.
    let bundle = std::env::temp_dir().join("webview-shell-demo");
    std::fs::create_dir_all(&bundle)?;
    std::fs::write(bundle.join("enhance.js"), "// demo behavior\n")?;
    std::fs::write(bundle.join("enhance.css"), "body { margin: 0 }\n")?;

    // Content side: page DOM + runtime posting through a channel.
    let dom = Arc::new(DemoDom::default());
    let (port, mut posted) = ChannelPort::unbounded();
    let runtime = Arc::new(ContentRuntime::new(
        Arc::clone(&dom) as Arc<dyn PageDom>,
        Arc::new(port.clone()),
    ));

    // Host side: shell over the in-memory surface.
    let surface = Arc::new(DemoSurface::new());
    surface.attach(Arc::clone(&runtime));

    let shell = Shell::builder()
        .surface(Arc::clone(&surface) as Arc<dyn ContentSurface>)
        .native(Arc::new(DemoNative))
        .theme(Theme::Dark)
        .development(&bundle)
        .build()?;

    // Route everything the content posts back into the shell.
    {
        let shell = shell.clone();
        tokio::spawn(async move {
            while let Some(raw) = posted.recv().await {
                shell.on_message(&raw);
            }
        });
    }

    shell.start();
    shell.on_content_loaded();

    // The page's bootstrap reports readiness; the shell answers with the
    // enhancement payload, whose trailing load command initializes the
    // runtime.
    port.post(&Envelope::event(MessageKind::ReadyForScript).encode());
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    info!(mode = ?runtime.mode(), "runtime initialized");

    // A rightward swipe opens the drawer.
    shell.on_drag(120.0, 10.0);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Hardware back with the drawer open closes it instead of exiting.
    shell.handle_back().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    info!(
        drawer_open = dom.is_drawer_open()?,
        "after back with open drawer"
    );

    // The inserted affordance reloads the surface when activated.
    if let Some(action) = dom.affordance.lock().as_ref() {
        action();
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    info!(
        surface_reloads = surface.reloads.load(Ordering::SeqCst),
        "after affordance activation"
    );

    Ok(())
}
