/// Container for system DMI data
#[derive(Debug, Clone, Default)]
pub struct DMIData {
    pub board_name: String,
    pub board_vendor: String,
    pub product_name: String,
    pub product_version: String,
    pub sys_vendor: String,
}
