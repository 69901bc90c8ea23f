use std::fs;

use procfs::{CpuInfo, Current};

use self::data::DMIData;

pub mod data;

/// Returns DMI data from the system
pub fn get_dmi_data() -> DMIData {
    let board_name = get_dmi_property("board_name");
    let board_vendor = get_dmi_property("board_vendor");
    let product_name = get_dmi_property("product_name");
    let product_version = get_dmi_property("product_version");
    let sys_vendor = get_dmi_property("sys_vendor");

    DMIData {
        board_name,
        board_vendor,
        product_name,
        product_version,
        sys_vendor,
    }
}

/// Returns the CPU info from the system
pub fn get_cpu_info() -> Result<CpuInfo, procfs::ProcError> {
    CpuInfo::current()
}

/// Read the given DMI property
fn get_dmi_property(name: &str) -> String {
    let path = format!("/sys/devices/virtual/dmi/id/{name}");
    fs::read_to_string(path)
        .unwrap_or_default()
        .replace('\n', "")
}
