/// Where messages meant for the user are written.
pub trait UserInterface {
    /// Write a message (help, action output).
    fn print(&self, message: String);

    /// Write an error message.
    fn print_error(&self, message: String);
}

/// Writes messages to stdout and errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}
