pub mod file_user_directory;
