pub mod leaderboard;
pub mod play_area;
pub mod progress_bar;
pub mod results;
pub mod start_menu;
