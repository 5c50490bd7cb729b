//! Model -> entity mappers

mod advertisement;
mod audit;
mod broadcast;
mod channel;
mod country;
mod number;
mod points;
mod proof;
mod subscription;
mod user;
