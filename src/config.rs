use dotenvy::dotenv;
use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Attendance time windows and geofence, injected into the clock
/// validator and the KPI engine. Hours are 24h local wall-clock.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceConfig {
    pub check_in_start_hour: u32,
    /// On-time reference hour; check-ins later than this count as delay.
    pub check_in_hour: u32,
    pub check_in_end_hour: u32,
    pub check_out_start_hour: u32,
    /// Expected shift-end reference hour, used for extra_seconds.
    pub check_out_hour: u32,
    pub check_out_end_hour: u32,

    pub company_latitude: f64,
    pub company_longitude: f64,
    /// Authorized radius (meters) around the company location.
    pub location_radius_m: f64,
}

impl AttendanceConfig {
    pub fn expected_shift_seconds(&self) -> f64 {
        (self.check_out_hour - self.check_in_hour) as f64 * 3600.0
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub attendance: AttendanceConfig,

    // Daily attendance materialization schedule (local time)
    pub daily_task_hour: u32,
    pub daily_task_minute: u32,
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} is not valid: {e:?}")),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", 900), // 15 min
            refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", 604800), // 7 days

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", 60),
            rate_register_per_min: env_or("RATE_REGISTER_PER_MIN", 30),
            rate_refresh_per_min: env_or("RATE_REFRESH_PER_MIN", 30),
            rate_protected_per_min: env_or("RATE_PROTECTED_PER_MIN", 1000),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            attendance: AttendanceConfig {
                check_in_start_hour: env_or("CHECK_IN_START_HOUR", 7),
                check_in_hour: env_or("CHECK_IN_HOUR", 9),
                check_in_end_hour: env_or("CHECK_IN_END_HOUR", 10),
                check_out_start_hour: env_or("CHECK_OUT_START_HOUR", 17),
                check_out_hour: env_or("CHECK_OUT_HOUR", 18),
                check_out_end_hour: env_or("CHECK_OUT_END_HOUR", 20),
                company_latitude: env_or("COMPANY_LATITUDE", 6.366132646225389),
                company_longitude: env_or("COMPANY_LONGITUDE", 2.429160219575613),
                location_radius_m: env_or("ATTENDANCE_LOCATION_RADIUS", 150.0),
            },

            daily_task_hour: env_or("DAILY_TASK_HOUR", 0),
            daily_task_minute: env_or("DAILY_TASK_MINUTE", 5),
        }
    }
}

#[cfg(test)]
pub fn test_attendance_config() -> AttendanceConfig {
    AttendanceConfig {
        check_in_start_hour: 7,
        check_in_hour: 9,
        check_in_end_hour: 10,
        check_out_start_hour: 17,
        check_out_hour: 18,
        check_out_end_hour: 20,
        company_latitude: 6.366132646225389,
        company_longitude: 2.429160219575613,
        location_radius_m: 150.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_shift_is_nine_hours_with_default_windows() {
        let cfg = test_attendance_config();
        assert_eq!(cfg.expected_shift_seconds(), 9.0 * 3600.0);
    }
}
