// Login, bearer tokens and the route guard.

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
