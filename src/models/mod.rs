pub mod game;

pub use game::GameSnapshot;
