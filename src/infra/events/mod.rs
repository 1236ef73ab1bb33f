pub mod memory_change_feed;
