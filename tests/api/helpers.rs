pub mod test_connection;
pub mod test_game;
