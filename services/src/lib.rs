pub mod anomaly_service;
pub mod app;
pub mod attendance_record;
pub mod attendance_session;
pub mod auth;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod qr;
pub mod router;
pub mod ui;
pub mod user_service;
pub mod util_service;

pub use app::AttendanceApp;
pub use error::AppError;
