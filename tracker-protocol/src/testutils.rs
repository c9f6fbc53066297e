use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// Unstructured event wrapping a `viewed_product` payload, unpadded.
pub const B64_SD_EVENT: &str = "eyJzY2hlbWEiOiJpZ2x1OmNvbS5zbm93cGxvd2FuYWx5dGljcy5zbm93cGxvdy91bnN0cnVjdF9ldmVudC9qc29uc2NoZW1hLzEtMC0wIiwiZGF0YSI6eyJzY2hlbWEiOiJpZ2x1OmNvbS5zaWx2ZXJ0b24uaW8vaG9uZXlwb3QvZXhhbXBsZS92aWV3ZWRfcHJvZHVjdC9qc29uc2NoZW1hLzEtMC0wIiwiZGF0YSI6eyJwcm9kdWN0SWQiOiJBU08wMTA0MyIsImNhdGVnb3J5IjoiRHJlc3NlcyIsImJyYW5kIjoiQUNNRSIsInJldHVybmluZyI6dHJ1ZSwicHJpY2UiOjQ5Ljk1LCJzaXplcyI6WyJ4cyIsInMiLCJsIiwieGwiLCJ4eGwiXSwiYXZhaWxhYmxlU2luY2UiOiIyMDEzLTA0LTA3VDA0OjAwOjAwLjAwMFoifX19";

/// Web page and performance timing contexts, unpadded.
pub const B64_CONTEXTS: &str = "eyJzY2hlbWEiOiJpZ2x1OmNvbS5zbm93cGxvd2FuYWx5dGljcy5zbm93cGxvdy9jb250ZXh0cy9qc29uc2NoZW1hLzEtMC0wIiwiZGF0YSI6W3sic2NoZW1hIjoiaWdsdTpjb20uc25vd3Bsb3dhbmFseXRpY3Muc25vd3Bsb3cvd2ViX3BhZ2UvanNvbnNjaGVtYS8xLTAtMCIsImRhdGEiOnsiaWQiOiI0ZTRjM2UzMS05Y2FkLTQ1YjgtYTMzOC1kMzNiN2E4ODQwMzQifX0seyJzY2hlbWEiOiJpZ2x1Om9yZy53My9QZXJmb3JtYW5jZVRpbWluZy9qc29uc2NoZW1hLzEtMC0wIiwiZGF0YSI6eyJuYXZpZ2F0aW9uU3RhcnQiOjE2NDg2NzEwOTQ1MTksInJlZGlyZWN0U3RhcnQiOjAsInJlZGlyZWN0RW5kIjowLCJmZXRjaFN0YXJ0IjoxNjQ4NjcxMDk3MDk3LCJkb21haW5Mb29rdXBTdGFydCI6MTY0ODY3MTA5NzEwMiwiZG9tYWluTG9va3VwRW5kIjoxNjQ4NjcxMDk3MTAyLCJjb25uZWN0U3RhcnQiOjE2NDg2NzEwOTcxMDIsInNlY3VyZUNvbm5lY3Rpb25TdGFydCI6MCwiY29ubmVjdEVuZCI6MTY0ODY3MTA5NzEwMywicmVxdWVzdFN0YXJ0IjoxNjQ4NjcxMDk3MTAzLCJyZXNwb25zZVN0YXJ0IjoxNjQ4NjcxMDk3MTA3LCJyZXNwb25zZUVuZCI6MTY0ODY3MTA5NzEwNywidW5sb2FkRXZlbnRTdGFydCI6MTY0ODY3MTA5NzExMCwidW5sb2FkRXZlbnRFbmQiOjE2NDg2NzEwOTcxMTAsImRvbUxvYWRpbmciOjE2NDg2NzEwOTQ1MjAsImRvbUludGVyYWN0aXZlIjoxNjQ4NjcxMDk0NTMyLCJkb21Db250ZW50TG9hZGVkRXZlbnRTdGFydCI6MTY0ODY3MTA5NDU3MywiZG9tQ29udGVudExvYWRlZEV2ZW50RW5kIjoxNjQ4NjcxMDk0NTc0LCJkb21Db21wbGV0ZSI6MTY0ODY3MTA5OTg4OSwibG9hZEV2ZW50U3RhcnQiOjE2NDg2NzEwOTk4ODksImxvYWRFdmVudEVuZCI6MTY0ODY3MTA5OTg4OX19XX0";

/// Five mobile contexts, padded, with escaped slashes in the JSON.
pub const B64_CONTEXTS_PADDED: &str = "eyJzY2hlbWEiOiJpZ2x1OmNvbS5zbm93cGxvd2FuYWx5dGljcy5zbm93cGxvd1wvY29udGV4dHNcL2pzb25zY2hlbWFcLzEtMC0xIiwiZGF0YSI6W3sic2NoZW1hIjoiaWdsdTpjb20uc25vd3Bsb3dhbmFseXRpY3Muc25vd3Bsb3dcL2NsaWVudF9zZXNzaW9uXC9qc29uc2NoZW1hXC8xLTAtMiIsImRhdGEiOnsic2Vzc2lvbkluZGV4IjoxLCJzdG9yYWdlTWVjaGFuaXNtIjoiTE9DQUxfU1RPUkFHRSIsImZpcnN0RXZlbnRUaW1lc3RhbXAiOiIyMDIyLTA5LTIxVDE2OjM4OjUyLjUxNVoiLCJmaXJzdEV2ZW50SWQiOiI5MmVhMTlhZS05NTkxLTQxYmUtYmM4My0zYTg2MGYwYmI1MmQiLCJzZXNzaW9uSWQiOiI5OTZlOTZhMi1mOTk5LTQ4YWQtYjNjMC0zNjAzNjQ2NmU1NmQiLCJldmVudEluZGV4IjoyLCJwcmV2aW91c1Nlc3Npb25JZCI6bnVsbCwidXNlcklkIjoiMGJiODc4YzMtZWMyZS00ODdkLWE3ODQtYTZlNmVjZDU3MGMzIn19LHsic2NoZW1hIjoiaWdsdTpjb20uc25vd3Bsb3dhbmFseXRpY3MubW9iaWxlXC9hcHBsaWNhdGlvblwvanNvbnNjaGVtYVwvMS0wLTAiLCJkYXRhIjp7ImJ1aWxkIjoiMTAwMDAiLCJ2ZXJzaW9uIjoiMS4wLjEtaGg0NUFuYWx5dGljc0ludGVncmF0aW9uLjIifX0seyJzY2hlbWEiOiJpZ2x1OmNvbS5zbm93cGxvd2FuYWx5dGljcy5zbm93cGxvd1wvbW9iaWxlX2NvbnRleHRcL2pzb25zY2hlbWFcLzEtMC0yIiwiZGF0YSI6eyJjYXJyaWVyIjoiTWludCIsInRvdGFsU3RvcmFnZSI6MTE2MTkxMjk3NTM2LCJzeXN0ZW1BdmFpbGFibGVNZW1vcnkiOjEwNzY1MzkzOTIsIm9zVmVyc2lvbiI6IjExIiwiYmF0dGVyeVN0YXRlIjoidW5wbHVnZ2VkIiwiYXZhaWxhYmxlU3RvcmFnZSI6MjcxMDA2MTQ2NTYsIm9zVHlwZSI6ImFuZHJvaWQiLCJkZXZpY2VNb2RlbCI6Ik9ORVBMVVMgQTYwMTMiLCJkZXZpY2VNYW51ZmFjdHVyZXIiOiJPbmVQbHVzIiwibmV0d29ya1R5cGUiOiJ3aWZpIiwicGh5c2ljYWxNZW1vcnkiOjU5MDQzODQwMDAsImJhdHRlcnlMZXZlbCI6Nzh9fSx7InNjaGVtYSI6ImlnbHU6Y29tLnNub3dwbG93YW5hbHl0aWNzLm1vYmlsZVwvc2NyZWVuXC9qc29uc2NoZW1hXC8xLTAtMCIsImRhdGEiOnsibmFtZSI6IldvcmtmbG93IiwiaWQiOiIwMTNhY2U4Yi1lODBiLTQxODQtYjUwOS1iNjk1ZWEyNzIwMmIifX0seyJzY2hlbWEiOiJpZ2x1OmNvbS5zbm93cGxvd2FuYWx5dGljcy5tb2JpbGVcL2FwcGxpY2F0aW9uX2xpZmVjeWNsZVwvanNvbnNjaGVtYVwvMS0wLTAiLCJkYXRhIjp7ImlzVmlzaWJsZSI6dHJ1ZX19XX0=";

pub fn encode_url_safe(json: &str) -> String {
    URL_SAFE_NO_PAD.encode(json)
}

pub fn encode_standard(json: &str) -> String {
    STANDARD.encode(json)
}
