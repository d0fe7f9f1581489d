//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements               | Connects to                 |
//! |----------------|--------------------------|-----------------------------|
//! | `hardware`     | LightPort, DoorPort,     | relay / servo / pump drivers|
//! |                | PumpPort                 |                             |
//! | `esp_board`    | (board bring-up)         | ESP32 ADC, GPIO, LEDC       |
//! | `sim`          | (board bring-up)         | in-process plant model      |
//! | `file_config`  | ConfigPort               | built-in table, JSON file   |
//! | `log_reporter` | ReportingBridge          | serial / console log        |
//! | `log_sink`     | EventSink                | serial / console log        |
//! | `time`         | WallClock                | newlib / `chrono::Local`    |

#[cfg(target_os = "espidf")]
pub mod esp_board;
pub mod file_config;
pub mod hardware;
pub mod log_reporter;
pub mod log_sink;
pub mod sim;
pub mod time;
