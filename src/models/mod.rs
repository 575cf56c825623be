pub mod notification;
pub mod response;
pub mod telegram;
pub mod validation;
