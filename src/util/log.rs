use std::fmt::{Display, Formatter};

use super::Log;

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Order of the log level, used to decide whether a trace line should print.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<TL: Display + Copy> Log<TL> {
    /// Print a trace line if `self`'s level is at or above `Log::Default`.
    pub fn trace(&self, message: std::fmt::Arguments) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Default(()).order() {
            println!("[{}]: {}", self, message)
        }
        #[cfg(not(debug_assertions))]
        let _ = message;
    }
}
