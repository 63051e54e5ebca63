use std::path::Path;

use sysinfo::System;

pub fn is_file_fits_ram(path: &Path) -> bool {
    let model_size_bytes =
        std::fs::metadata(path).map(|metadata| metadata.len()).unwrap_or(0);

    let mut sys = System::new();
    sys.refresh_memory();

    let allowed_bytes = sys.total_memory() * 60 / 100;
    model_size_bytes <= allowed_bytes
}
