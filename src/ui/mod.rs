mod toolbar;
mod plot;
mod help_dialog;

pub use toolbar::render_toolbar;
pub use plot::render_plot;
pub use help_dialog::render_help_dialog;
