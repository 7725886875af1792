//! Telemetry log rows
//!
//! The persistent log is a `;`-delimited text table. A header line is written
//! once per brewing run, followed by one row per telemetry tick:
//!
//! ```text
//! TempoSeg;TempAtual;SaidaPWM;Curva
//! 11;25.11;1023;1
//! ```

use core::fmt::Write;

use heapless::String;

/// Header line written at the start of each run
pub const LOG_HEADER: &str = "TempoSeg;TempAtual;SaidaPWM;Curva";

/// Maximum length of a formatted log line
pub const LOG_LINE_LEN: usize = 48;

/// A formatted log line
pub type LogLine = String<LOG_LINE_LEN>;

/// One telemetry sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogRow {
    /// Seconds since boot
    pub elapsed_s: u32,
    /// Measured temperature (°C)
    pub temperature: f32,
    /// Heater output (PWM counts)
    pub duty: u16,
    /// 1-based rest number
    pub step_number: u8,
}

impl LogRow {
    /// Render the row as a log line
    pub fn format(&self) -> LogLine {
        let mut line = LogLine::new();
        // Longest possible row is well under LOG_LINE_LEN
        let _ = write!(
            line,
            "{};{:.2};{};{}",
            self.elapsed_s, self.temperature, self.duty, self.step_number
        );
        line
    }
}

/// Work for the logger task
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogRequest {
    /// Start a new run with a header line
    Header,
    /// Append a row
    Row(LogRow),
    /// Print every stored line to the diagnostic stream
    Dump,
}

impl LogRequest {
    /// The line to append for this request, if any
    pub fn line(&self) -> Option<LogLine> {
        match self {
            LogRequest::Header => {
                let mut line = LogLine::new();
                let _ = line.push_str(LOG_HEADER);
                Some(line)
            }
            LogRequest::Row(row) => Some(row.format()),
            LogRequest::Dump => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_format() {
        let row = LogRow {
            elapsed_s: 11,
            temperature: 25.11,
            duty: 1023,
            step_number: 1,
        };
        assert_eq!(row.format().as_str(), "11;25.11;1023;1");
    }

    #[test]
    fn test_row_format_rounds_to_two_places() {
        let row = LogRow {
            elapsed_s: 24,
            temperature: 68.576,
            duty: 968,
            step_number: 2,
        };
        assert_eq!(row.format().as_str(), "24;68.58;968;2");
    }

    #[test]
    fn test_row_fits_worst_case() {
        let row = LogRow {
            elapsed_s: u32::MAX,
            temperature: -999.0,
            duty: u16::MAX,
            step_number: u8::MAX,
        };
        assert_eq!(row.format().as_str(), "4294967295;-999.00;65535;255");
    }

    #[test]
    fn test_request_lines() {
        assert_eq!(LogRequest::Header.line().unwrap().as_str(), LOG_HEADER);
        assert!(LogRequest::Dump.line().is_none());
    }
}
