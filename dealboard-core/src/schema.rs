//! Worksheet column names.
//!
//! The deals sheet is a HubSpot export with mixed English/Japanese headers;
//! the reference sheets are maintained by hand. Field access elsewhere goes
//! through these constants so a renamed column is a one-line change.

/// Deals worksheet.
pub mod deals {
    pub const RECORD_ID: &str = "Record ID";
    pub const NAME: &str = "Deal Name";
    pub const OWNER_ID: &str = "Deal owner";
    pub const STAGE_ID: &str = "Deal Stage";
    pub const DEAL_TYPE: &str = "Deal Type";
    pub const AMOUNT: &str = "金額";
    pub const WON_AMOUNT: &str = "受注金額";
    pub const OUTCOME: &str = "受注/失注";
    pub const FIRST_MEETING: &str = "初回商談実施日";
    pub const CLOSE_DATE: &str = "受注日";
    pub const TARGET_CLOSE: &str = "受注目標日";
    pub const REPORT_DATE: &str = "報告/提案日";
    pub const DELIVERY_DATE: &str = "納品予定日";
    pub const LEAD_PATH: &str = "リード経路";
}

/// Users worksheet.
pub mod users {
    pub const ID: &str = "ID";
    pub const FIRST_NAME: &str = "First Name";
    pub const LAST_NAME: &str = "Last Name";
}

/// Stage window of the OtherParams worksheet (headerless; these names are
/// assigned to the two columns of the fixed range).
pub mod stages {
    pub const ID: &str = "Stage ID";
    pub const NAME: &str = "Stage Name";
}
