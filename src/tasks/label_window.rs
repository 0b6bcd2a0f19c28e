use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context, Result};
use softbuffer::{Context as SoftContext, Surface};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalSize, Size};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::Configuration;
use crate::gpu::preview::MINIMUM_SIZE_HINT;
use crate::label::{ImageFitLabel, PixelCanvas};
use crate::processing::decode::decode_rgba8;

const BACKGROUND: u32 = 0x0020_2020;

type WindowHandle = Arc<Window>;

struct LabelApp {
    cfg: Configuration,
    window: Option<WindowHandle>,
    context: Option<SoftContext<WindowHandle>>,
    surface: Option<Surface<WindowHandle, WindowHandle>>,
    canvas: PixelCanvas,
    label: ImageFitLabel,
    needs_redraw: bool,
}

impl LabelApp {
    fn new(cfg: Configuration, label: ImageFitLabel) -> Self {
        let canvas = PixelCanvas::new(cfg.window.width, cfg.window.height);
        Self {
            cfg,
            window: None,
            context: None,
            surface: None,
            canvas,
            label,
            needs_redraw: true,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }

        let (min_w, min_h) = MINIMUM_SIZE_HINT;
        let attrs = Window::default_attributes()
            .with_title(self.cfg.window.title.clone())
            .with_inner_size(Size::Physical(PhysicalSize::new(
                self.cfg.window.width,
                self.cfg.window.height,
            )))
            .with_min_inner_size(Size::Physical(PhysicalSize::new(min_w, min_h)));
        let window = WindowHandle::new(
            event_loop
                .create_window(attrs)
                .context("failed to create label window")?,
        );

        let context = SoftContext::new(window.clone())
            .map_err(|err| anyhow::anyhow!("failed to create softbuffer context: {err}"))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| anyhow::anyhow!("failed to create softbuffer surface: {err}"))?;

        self.context = Some(context);
        self.surface = Some(surface);
        self.window = Some(window.clone());
        self.handle_resize(window.inner_size());
        info!("label window ready");
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(surface) = self.surface.as_mut()
            && let (Some(width), Some(height)) = (
                NonZeroU32::new(size.width.max(1)),
                NonZeroU32::new(size.height.max(1)),
            )
        {
            if let Err(err) = surface.resize(width, height) {
                error!(error = %err, "failed to resize label surface");
                return;
            }
            self.canvas.resize(width.get(), height.get());
            debug!(width = width.get(), height = height.get(), "label surface resized");
            self.needs_redraw = true;
        }
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.canvas.clear(BACKGROUND);
        if let Err(err) = self.label.on_redraw(&mut self.canvas) {
            error!(error = %err, "label redraw failed");
        }
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                if buffer.len() != self.canvas.pixels().len() {
                    debug!("label surface size changed mid-frame; skipping present");
                    self.needs_redraw = true;
                    return;
                }
                buffer.copy_from_slice(self.canvas.pixels());
                if let Err(err) = buffer.present() {
                    error!(error = %err, "failed to present label frame");
                }
            }
            Err(err) => error!(error = %err, "failed to map label surface"),
        }
    }
}

impl ApplicationHandler for LabelApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.ensure_window(event_loop) {
            error!(error = ?err, "failed to initialize label window");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!("label window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                self.handle_resize(size);
            }
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.label.take_redraw_request() {
            self.needs_redraw = true;
        }
        if self.needs_redraw {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
            self.needs_redraw = false;
        }
    }
}

/// Opens a window showing the configured label image scaled to fit.
pub fn run(cfg: Configuration) -> Result<()> {
    let path = cfg.require_label_image()?.to_path_buf();
    let image = decode_rgba8(&path)
        .with_context(|| format!("loading label image {}", path.display()))?;
    info!(path = %path.display(), "showing label image");

    let mut label = ImageFitLabel::new(cfg.label.filter, cfg.label.scale_mode);
    label.set_image(image);

    let event_loop = EventLoop::new().context("failed to build label event loop")?;
    let mut app = LabelApp::new(cfg, label);
    event_loop.run_app(&mut app).context("label event loop failed")
}
