use crate::fileformat::StageFormat;
use crate::neighbor::MAX_LINK_RADIUS;
use crate::runtime::{Error, Result};

pub struct IO {
    pub path_in: Vec<std::path::PathBuf>,
    pub path_out: std::path::PathBuf,
    pub path_tmp: std::path::PathBuf,
    pub format: StageFormat,
    pub force: bool,
    pub cleanup: bool,
}

#[derive(Clone, Debug)]
pub struct Runtime {
    /// Longest near-duplicate chain the propagation rounds are sized for
    pub max_radius: usize,
    pub rounds: usize,
    pub link_radius: usize,
    pub window: Option<usize>,
    pub join_mates: bool,
}

impl Runtime {
    ///////////////////////////////
    /// Validate before any stage runs. Without an explicit round count, R rounds plus one are run
    pub fn new(
        max_radius: usize,
        rounds: Option<usize>,
        link_radius: usize,
        window: Option<usize>,
        join_mates: bool,
    ) -> Result<Self> {
        let rounds = match rounds {
            Some(0) => return Err(Error::configuration("the round count must be at least 1")),
            Some(r) => r,
            None => max_radius + 1,
        };
        if link_radius > MAX_LINK_RADIUS {
            return Err(Error::configuration(format!(
                "link radius {} is above the maximum of {}",
                link_radius, MAX_LINK_RADIUS
            )));
        }
        if window == Some(0) {
            return Err(Error::configuration("the key window must be at least 1"));
        }

        Ok(Runtime {
            max_radius,
            rounds,
            link_radius,
            window,
            join_mates,
        })
    }
}

impl Runtime {
    /// False when an explicit round count is below what `max_radius` asks for
    pub fn covers_max_radius(&self) -> bool {
        self.rounds > self.max_radius
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime {
            max_radius: 1,
            rounds: 2,
            link_radius: 1,
            window: None,
            join_mates: false,
        }
    }
}

pub struct Threading {
    pub threads_work: usize,
    pub task_attempts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_follow_the_radius() {
        assert_eq!(Runtime::new(0, None, 1, None, false).unwrap().rounds, 1);
        assert_eq!(Runtime::new(3, None, 1, None, false).unwrap().rounds, 4);
        assert_eq!(Runtime::new(3, Some(2), 1, None, false).unwrap().rounds, 2);
    }

    #[test]
    fn round_override_can_undercut_the_radius() {
        assert!(Runtime::new(3, None, 1, None, false).unwrap().covers_max_radius());
        assert!(Runtime::new(3, Some(5), 1, None, false).unwrap().covers_max_radius());
        assert!(!Runtime::new(3, Some(2), 1, None, false).unwrap().covers_max_radius());
    }

    #[test]
    fn invalid_settings_fail_fast() {
        assert!(matches!(
            Runtime::new(1, Some(0), 1, None, false),
            Err(Error::Configuration { .. })
        ));
        assert!(Runtime::new(1, None, MAX_LINK_RADIUS + 1, None, false).is_err());
        assert!(Runtime::new(1, None, 1, Some(0), false).is_err());
    }
}
