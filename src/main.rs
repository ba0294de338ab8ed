mod app;
mod gpu;
mod input;
mod ui;

use app::App;

fn main() {
    env_logger::init();
    log::info!("Starting wardmap");

    let event_loop = winit::event_loop::EventLoop::new().expect("failed to create event loop");
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Wait);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("event loop error");
}
