//! Application handler: window, GPU surface, egui overlay and the mounted
//! showcase

use crate::content::PanelContent;
use crate::overlay;
use crate::panels::{PopupAction, PopupView};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use vitrine_asset::{AssetKey, AssetLoader, ThreadedLoader};
use vitrine_core::ShowcaseConfig;
use vitrine_render::{RenderContext, SceneRenderer};
use vitrine_scene::{Showcase, SystemClock, Viewport};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowId};

/// Pixels per wheel line, matching a browser's line-mode wheel events
const LINE_HEIGHT: f32 = 100.0;

/// Window placement requested on the command line
#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Wheel delta in pixels, positive when scrolling down
pub fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

pub struct ShowcaseApp {
    config: ShowcaseConfig,
    options: WindowOptions,
    content: PanelContent,

    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    scene_renderer: Option<SceneRenderer>,
    showcase: Option<Showcase>,
    loader: Option<ThreadedLoader>,

    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    popup_view: PopupView,

    cursor_position: Option<PhysicalPosition<f64>>,
    last_frame_time: Instant,
}

impl ShowcaseApp {
    pub fn new(config: ShowcaseConfig, options: WindowOptions, content: PanelContent) -> Self {
        let popup_view = PopupView::new(config.asset_root.clone());
        Self {
            config,
            options,
            content,
            window: None,
            render_context: None,
            scene_renderer: None,
            showcase: None,
            loader: None,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            egui_renderer: None,
            popup_view,
            cursor_position: None,
            last_frame_time: Instant::now(),
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create showcase window")?,
        );
        if self.options.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        self.window = Some(window.clone());

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to initialize render context")?;

        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let mut loader = ThreadedLoader::new();
        let showcase = Showcase::mount(
            self.config.clone(),
            viewport,
            Box::new(SystemClock::new()),
            &mut loader,
        );

        let scene_renderer = SceneRenderer::new(&render_context, showcase.lights())
            .context("Failed to create scene renderer")?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &render_context.device,
            render_context.config.format,
            None,
            1,
            false,
        );

        self.render_context = Some(render_context);
        self.scene_renderer = Some(scene_renderer);
        self.showcase = Some(showcase);
        self.loader = Some(loader);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        self.last_frame_time = Instant::now();

        Ok(())
    }

    /// Apply finished loads and upload what they placed
    fn poll_assets(&mut self) {
        let (Some(loader), Some(showcase), Some(renderer), Some(context)) = (
            self.loader.as_mut(),
            self.showcase.as_mut(),
            self.scene_renderer.as_mut(),
            self.render_context.as_ref(),
        ) else {
            return;
        };

        for result in loader.poll() {
            let outcome = showcase.apply_load_result(result);
            if let Some(key) = outcome.placed {
                upload_asset(showcase, renderer, context, key);
            }
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32().min(0.1);
        self.last_frame_time = now;

        let (Some(showcase), Some(context), Some(renderer)) = (
            self.showcase.as_mut(),
            self.render_context.as_mut(),
            self.scene_renderer.as_ref(),
        ) else {
            return;
        };
        if !showcase.frame(dt) {
            return;
        }

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return;
            }
            Err(e) => {
                tracing::warn!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(context, showcase.camera(), &showcase.render_list(), &view);

        if let Some(PopupAction::Close) = self.render_egui(&view) {
            if let Some(showcase) = &mut self.showcase {
                showcase.close_popup();
            }
        }

        output.present();
    }

    fn render_egui(&mut self, target_view: &wgpu::TextureView) -> Option<PopupAction> {
        let (Some(window), Some(context), Some(egui_winit), Some(egui_renderer), Some(showcase)) = (
            self.window.as_ref(),
            self.render_context.as_ref(),
            self.egui_winit.as_mut(),
            self.egui_renderer.as_mut(),
            self.showcase.as_ref(),
        ) else {
            return None;
        };
        let content = &self.content;
        let popup_view = &mut self.popup_view;

        let raw_input = egui_winit.take_egui_input(window);
        let mut action = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            overlay::title_ui(ctx, &showcase.config().title, showcase.elapsed());
            overlay::loading_ui(ctx, showcase.progress_percent());
            action = popup_view.ui(ctx, showcase.popup(), content);
            if showcase.is_hovering() && !ctx.is_pointer_over_area() {
                ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        });

        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.config.width, context.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui Encoder"),
            });

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&context.device, &context.queue, *id, image_delta);
        }

        egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        context.queue.submit(std::iter::once(encoder.finish()));

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        action
    }

    /// Cursor position in logical pixels
    fn logical_cursor(&self) -> Option<(f32, f32)> {
        let position = self.cursor_position?;
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        let logical = position.to_logical::<f32>(scale);
        Some((logical.x, logical.y))
    }

    /// Release the renderer, then the scene, then the loader and surface.
    /// Loads still in flight are dropped with the loader's channel.
    fn teardown(&mut self) {
        if let Some(renderer) = &mut self.scene_renderer {
            renderer.dispose();
        }
        if let Some(showcase) = &mut self.showcase {
            showcase.unmount();
        }
        self.loader = None;
        self.egui_renderer = None;
        self.egui_winit = None;
        self.scene_renderer = None;
        self.showcase = None;
        self.render_context = None;
    }
}

fn upload_asset(showcase: &Showcase, renderer: &mut SceneRenderer, context: &RenderContext, key: AssetKey) {
    match key {
        AssetKey::BackgroundTexture => {
            if let Some(texture) = showcase.background_texture() {
                if let Err(e) = renderer.set_background_texture(&context.device, &context.queue, texture) {
                    tracing::warn!("Background texture rejected: {}", e);
                }
            }
        }
        _ => {
            if let Some(model) = showcase.model(key) {
                renderer.upload_model(&context.device, &context.queue, key, model);
            }
        }
    }
}

impl ApplicationHandler for ShowcaseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                tracing::error!("Failed to initialize showcase: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                // A drag that ends over a panel still ends
                if let WindowEvent::MouseInput {
                    state: ElementState::Released,
                    button: MouseButton::Left,
                    ..
                } = event
                {
                    if let Some(showcase) = &mut self.showcase {
                        showcase.on_pointer_up();
                    }
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                if let Some(showcase) = &mut self.showcase {
                    showcase.on_resize(Viewport::from_physical(new_size.width, new_size.height, scale));
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = Some(position);
                if let Some((x, y)) = self.logical_cursor() {
                    if let Some(showcase) = &mut self.showcase {
                        showcase.on_pointer_move(x, y);
                    }
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor_position = None;
                if let Some(showcase) = &mut self.showcase {
                    showcase.on_pointer_up();
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let cursor = self.logical_cursor();
                if let (Some((x, y)), Some(showcase)) = (cursor, &mut self.showcase) {
                    match state {
                        ElementState::Pressed => showcase.on_pointer_down(x, y),
                        ElementState::Released => {
                            showcase.on_pointer_up();
                            showcase.on_click(x, y);
                        }
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(showcase) = &mut self.showcase {
                    showcase.on_wheel(wheel_delta_y(delta));
                }
            }

            WindowEvent::RedrawRequested => {
                self.poll_assets();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_lines_scale_to_pixels() {
        // One notch towards the user scrolls down
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, -1.0)), 100.0);
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 2.0)), -200.0);
    }

    #[test]
    fn wheel_pixels_pass_through() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -42.0));
        assert_eq!(wheel_delta_y(delta), 42.0);
    }

    #[test]
    fn default_window_is_720p() {
        let options = WindowOptions::default();
        assert_eq!((options.width, options.height), (1280, 720));
        assert!(!options.fullscreen);
    }
}
