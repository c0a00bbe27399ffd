pub mod approve;
pub mod deduct;
pub mod generate;
pub mod grant;
pub mod login;
pub mod reject;
pub mod signup;
pub mod submit;
