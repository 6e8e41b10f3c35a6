//! Allowance merge functionality.
//!
//! Allowance claims are stored one type per record. Tables show one row per
//! employee per month, so records sharing
//! `(employeeId.employeeId, allowanceMonth, allowanceYear)` are folded
//! together here.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ctc::approved_totals_by_type;
use crate::error::EngineResult;
use crate::models::{
    AllowanceEntry, AllowanceRecord, AllowanceStatus, AuditStep, AuditWarning, EmployeeCode,
    EmployeeRef, Month, checked_sum,
};

/// The grouping key of a merged row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    /// The employee code.
    pub employee: EmployeeCode,
    /// The allowance month.
    pub month: Month,
    /// The allowance year.
    pub year: i32,
}

/// One row per employee per month, with per-type values kept as parallel lists.
///
/// `allowance_type[i]`, `allowance_amount[i]` and `status[i]` describe the
/// `i`-th record merged into the row, in input order. Every other field is
/// taken from the first record of the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedAllowanceRow {
    /// Document id of the first record.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The employee, as referenced by the first record.
    pub employee_id: EmployeeRef,
    /// The allowance month.
    pub allowance_month: Month,
    /// The allowance year.
    pub allowance_year: i32,
    /// Allowance type of each merged record.
    pub allowance_type: Vec<String>,
    /// Amount of each merged record, missing amounts as zero.
    pub allowance_amount: Vec<Decimal>,
    /// Approval state of each merged record.
    pub status: Vec<AllowanceStatus>,
    /// Voucher number of the first record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_no: Option<String>,
    /// Client of the first record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Project number of the first record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_no: Option<String>,
}

impl MergedAllowanceRow {
    fn start(record: &AllowanceRecord, employee: EmployeeRef) -> Self {
        Self {
            id: record.id.clone(),
            employee_id: employee,
            allowance_month: record.allowance_month,
            allowance_year: record.allowance_year,
            allowance_type: Vec::new(),
            allowance_amount: Vec::new(),
            status: Vec::new(),
            voucher_no: record.voucher_no.clone(),
            client: record.client.clone(),
            project_no: record.project_no.clone(),
        }
    }

    fn push(&mut self, record: &AllowanceRecord) {
        self.allowance_type.push(record.allowance_type.clone());
        self.allowance_amount.push(record.amount());
        self.status.push(record.status);
    }

    /// Returns the row's values as CTC entries, in merge order.
    pub fn entries(&self) -> Vec<AllowanceEntry> {
        self.allowance_type
            .iter()
            .zip(&self.allowance_amount)
            .zip(&self.status)
            .map(|((allowance_type, amount), status)| AllowanceEntry {
                allowance_type: allowance_type.clone(),
                amount: Some(*amount),
                status: *status,
            })
            .collect()
    }

    /// Sum of approved amounts across all types.
    pub fn approved_total(&self) -> EngineResult<Decimal> {
        checked_sum(
            self.allowance_amount
                .iter()
                .zip(&self.status)
                .filter(|(_, status)| status.is_approved())
                .map(|(amount, _)| *amount),
            "approved allowance total",
        )
    }

    /// Approved amounts summed per type, under the same rule as
    /// [`CtcResult::approved_by_type`](super::CtcResult::approved_by_type):
    /// types whose entries are all pending or rejected are not listed.
    pub fn approved_by_type(&self) -> EngineResult<BTreeMap<String, Decimal>> {
        approved_totals_by_type(&self.entries())
    }
}

/// The result of merging allowance records.
#[derive(Debug, Clone)]
pub struct AllowanceMergeResult {
    /// Merged rows in order of first appearance.
    pub rows: Vec<MergedAllowanceRow>,
    /// Input indexes of records skipped for lack of an employee code.
    pub skipped: Vec<usize>,
    /// One warning per skipped record.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Folds allowance records into one row per employee per month.
///
/// Rows appear in the order their key is first seen, and values inside a row
/// keep input order, so the output is deterministic for a given input order.
/// A record whose `employeeId.employeeId` is missing cannot be grouped; it is
/// skipped and reported rather than failing the whole merge.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::merge_allowance_records;
/// use payroll_engine::models::AllowanceRecord;
///
/// let records: Vec<AllowanceRecord> = serde_json::from_str(r#"[
///     {"employeeId": {"employeeId": 7}, "allowanceType": "bonus", "allowanceAmount": 500,
///      "allowanceMonth": "June", "allowanceYear": 2024, "status": "approved"},
///     {"employeeId": {"employeeId": 7}, "allowanceType": "ltc", "allowanceAmount": 200,
///      "allowanceMonth": "June", "allowanceYear": 2024, "status": "pending"}
/// ]"#).unwrap();
///
/// let result = merge_allowance_records(&records, 1);
/// assert_eq!(result.rows.len(), 1);
/// assert_eq!(result.rows[0].allowance_type, vec!["bonus", "ltc"]);
/// ```
pub fn merge_allowance_records(
    records: &[AllowanceRecord],
    step_number: u32,
) -> AllowanceMergeResult {
    let mut rows: Vec<MergedAllowanceRow> = Vec::new();
    let mut index: HashMap<MergeKey, usize> = HashMap::new();
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();

    for (position, record) in records.iter().enumerate() {
        let Some((employee, code)) = record
            .employee_id
            .as_ref()
            .and_then(|e| e.employee_id.clone().map(|code| (e, code)))
        else {
            skipped.push(position);
            warnings.push(AuditWarning::new(
                "MISSING_EMPLOYEE_REFERENCE",
                format!(
                    "Allowance record {} ({}) has no employee code and was skipped",
                    position, record.allowance_type
                ),
                "medium",
            ));
            continue;
        };

        let key = MergeKey {
            employee: code,
            month: record.allowance_month,
            year: record.allowance_year,
        };

        let row_index = *index.entry(key).or_insert_with(|| {
            rows.push(MergedAllowanceRow::start(record, employee.clone()));
            rows.len() - 1
        });
        rows[row_index].push(record);
    }

    let merged_records = records.len() - skipped.len();
    let audit_step = AuditStep {
        step_number,
        rule_id: "allowance_merge".to_string(),
        rule_name: "Allowance Merge".to_string(),
        formula: "group by (employeeId.employeeId, allowanceMonth, allowanceYear)".to_string(),
        input: serde_json::json!({
            "records": records.len()
        }),
        output: serde_json::json!({
            "rows": rows.len(),
            "merged_records": merged_records,
            "skipped_records": skipped
        }),
        reasoning: format!(
            "{} records merged into {} rows, {} skipped",
            merged_records,
            rows.len(),
            skipped.len()
        ),
    };

    AllowanceMergeResult {
        rows,
        skipped,
        warnings,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(code: u64) -> Option<EmployeeRef> {
        Some(EmployeeRef {
            employee_id: Some(EmployeeCode::Number(code)),
            ..Default::default()
        })
    }

    fn record(
        employee_id: Option<EmployeeRef>,
        allowance_type: &str,
        amount: &str,
        month: Month,
        status: AllowanceStatus,
    ) -> AllowanceRecord {
        AllowanceRecord {
            id: None,
            employee_id,
            allowance_type: allowance_type.to_string(),
            allowance_amount: Some(dec(amount)),
            allowance_month: month,
            allowance_year: 2024,
            status,
            voucher_no: None,
            client: None,
            project_no: None,
        }
    }

    #[test]
    fn test_same_key_merges_into_one_row() {
        let records = vec![
            record(employee(7), "bonus", "500", Month::June, AllowanceStatus::Approved),
            record(employee(7), "ltc", "200", Month::June, AllowanceStatus::Pending),
        ];

        let result = merge_allowance_records(&records, 1);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.allowance_type, vec!["bonus", "ltc"]);
        assert_eq!(row.allowance_amount, vec![dec("500"), dec("200")]);
        assert_eq!(
            row.status,
            vec![AllowanceStatus::Approved, AllowanceStatus::Pending]
        );
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_different_months_and_employees_stay_apart() {
        let records = vec![
            record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(8), "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(7), "site", "100", Month::July, AllowanceStatus::Approved),
        ];

        let result = merge_allowance_records(&records, 1);
        assert_eq!(result.rows.len(), 3);
    }

    #[test]
    fn test_rows_keep_first_seen_order() {
        let records = vec![
            record(employee(9), "site", "1", Month::June, AllowanceStatus::Pending),
            record(employee(3), "site", "2", Month::June, AllowanceStatus::Pending),
            record(employee(9), "food", "3", Month::June, AllowanceStatus::Pending),
        ];

        let result = merge_allowance_records(&records, 1);
        let codes: Vec<_> = result
            .rows
            .iter()
            .map(|r| r.employee_id.employee_id.clone())
            .collect();
        assert_eq!(
            codes,
            vec![Some(EmployeeCode::Number(9)), Some(EmployeeCode::Number(3))]
        );
        assert_eq!(result.rows[0].allowance_type, vec!["site", "food"]);
    }

    #[test]
    fn test_scalar_fields_come_from_first_record() {
        let mut first = record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved);
        first.voucher_no = Some("VCH-1".to_string());
        first.client = Some("Acme".to_string());
        let mut second = record(employee(7), "food", "50", Month::June, AllowanceStatus::Approved);
        second.voucher_no = Some("VCH-2".to_string());
        second.project_no = Some("P-9".to_string());

        let result = merge_allowance_records(&[first, second], 1);
        let row = &result.rows[0];
        assert_eq!(row.voucher_no.as_deref(), Some("VCH-1"));
        assert_eq!(row.client.as_deref(), Some("Acme"));
        assert!(row.project_no.is_none());
    }

    #[test]
    fn test_missing_employee_code_is_skipped() {
        let bare_id = Some(EmployeeRef {
            id: Some("64f0".to_string()),
            ..Default::default()
        });
        let records = vec![
            record(None, "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved),
            record(bare_id, "site", "100", Month::June, AllowanceStatus::Approved),
        ];

        let result = merge_allowance_records(&records, 1);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.skipped, vec![0, 2]);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[0].code, "MISSING_EMPLOYEE_REFERENCE");
        assert_eq!(result.audit_step.output["merged_records"], 1);
    }

    #[test]
    fn test_approved_totals() {
        let records = vec![
            record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(7), "site", "50", Month::June, AllowanceStatus::Pending),
            record(employee(7), "site", "25", Month::June, AllowanceStatus::Approved),
            record(employee(7), "food", "80", Month::June, AllowanceStatus::Rejected),
        ];

        let result = merge_allowance_records(&records, 1);
        let row = &result.rows[0];

        assert_eq!(row.approved_total().unwrap(), dec("125"));
        let by_type = row.approved_by_type().unwrap();
        assert_eq!(by_type["site"], dec("125"));
        assert!(!by_type.contains_key("food"));
        // unapproved values are kept for display
        assert_eq!(row.allowance_amount.len(), 4);
    }

    #[test]
    fn test_row_and_ctc_agree_on_approved_types() {
        let records = vec![
            record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(7), "ltc", "40", Month::June, AllowanceStatus::Pending),
            record(employee(7), "bonus", "0", Month::June, AllowanceStatus::Approved),
        ];
        let result = merge_allowance_records(&records, 1);
        let row = &result.rows[0];

        let ctc = crate::calculation::calculate_ctc_from_merged(
            Decimal::ZERO,
            &result.rows,
            &[],
            2,
        )
        .unwrap();
        let by_type = row.approved_by_type().unwrap();
        assert_eq!(by_type, ctc.approved_by_type);
        assert_eq!(by_type.keys().collect::<Vec<_>>(), vec!["bonus", "site"]);
        assert_eq!(row.approved_total().unwrap(), ctc.dynamic_total);
    }

    #[test]
    fn test_oversized_approved_amounts_report_overflow() {
        let huge = "79228162514264337593543950000";
        let records = vec![
            record(employee(7), "site", huge, Month::June, AllowanceStatus::Approved),
            record(employee(7), "site", huge, Month::June, AllowanceStatus::Approved),
        ];
        let result = merge_allowance_records(&records, 1);
        let row = &result.rows[0];

        assert!(matches!(
            row.approved_total(),
            Err(crate::error::EngineError::AmountOverflow { .. })
        ));
        assert!(row.approved_by_type().is_err());
    }

    #[test]
    fn test_entries_round_trip_statuses() {
        let records = vec![
            record(employee(7), "site", "100", Month::June, AllowanceStatus::Approved),
            record(employee(7), "ltc", "40", Month::June, AllowanceStatus::Pending),
        ];
        let result = merge_allowance_records(&records, 1);
        let entries = result.rows[0].entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].allowance_type, "ltc");
        assert_eq!(entries[1].status, AllowanceStatus::Pending);
    }

    #[test]
    fn test_empty_input() {
        let result = merge_allowance_records(&[], 1);
        assert!(result.rows.is_empty());
        assert!(result.skipped.is_empty());
        assert_eq!(result.audit_step.reasoning, "0 records merged into 0 rows, 0 skipped");
    }

    #[test]
    fn test_row_serializes_with_ui_field_names() {
        let records = vec![record(employee(7), "bonus", "500", Month::June, AllowanceStatus::Approved)];
        let result = merge_allowance_records(&records, 1);
        let json = serde_json::to_value(&result.rows[0]).unwrap();

        assert_eq!(json["employeeId"]["employeeId"], 7);
        assert_eq!(json["allowanceType"], serde_json::json!(["bonus"]));
        assert_eq!(json["allowanceAmount"], serde_json::json!(["500"]));
        assert_eq!(json["status"], serde_json::json!(["approved"]));
        assert_eq!(json["allowanceMonth"], "June");
    }
}
