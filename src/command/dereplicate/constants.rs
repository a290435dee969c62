pub const DEREPLICATE_DEFAULT_PATH_OUT: &str = "out/dereplicated.fasta";
pub const DEREPLICATE_DEFAULT_PATH_TMP: &str = "out/temp";
pub const DEREPLICATE_DEFAULT_MAX_RADIUS: usize = 1;
pub const DEREPLICATE_DEFAULT_LINK_RADIUS: usize = 1;
pub const DEREPLICATE_DEFAULT_TASK_ATTEMPTS: usize = 2;
pub const DEREPLICATE_DEFAULT_FORMAT: &str = "text";
