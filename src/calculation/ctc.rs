//! Cost-to-company (CTC) aggregation.
//!
//! CTC is gross salary plus every approved variable (monthly) and fixed
//! (periodic) allowance for the period.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::allowance_merge::MergedAllowanceRow;
use crate::error::{EngineError, EngineResult};
use crate::models::{AllowanceEntry, AuditStep, checked_sum};

/// The result of a CTC aggregation, including the audit step.
#[derive(Debug, Clone)]
pub struct CtcResult {
    /// The gross salary the allowances were added to.
    pub gross_salary: Decimal,
    /// Sum of approved variable allowances.
    pub dynamic_total: Decimal,
    /// Sum of approved fixed allowances.
    pub fixed_total: Decimal,
    /// `gross_salary + dynamic_total + fixed_total`.
    pub total_ctc: Decimal,
    /// Approved amounts summed per allowance type across both lists. A type
    /// appears only if at least one of its entries is approved.
    pub approved_by_type: BTreeMap<String, Decimal>,
    /// Number of pending or rejected entries left out of the sums.
    pub excluded_entries: usize,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn approved_sum(entries: &[AllowanceEntry], operation: &str) -> EngineResult<Decimal> {
    checked_sum(entries.iter().map(AllowanceEntry::approved_amount), operation)
}

fn overflow(operation: &str) -> EngineError {
    EngineError::AmountOverflow {
        operation: operation.to_string(),
    }
}

/// Sums approved amounts per allowance type.
///
/// A type is listed only if at least one of its entries is approved; an
/// approved entry without an amount lists its type at zero. Pending and
/// rejected entries never create a key.
pub(crate) fn approved_totals_by_type<'a, I>(
    entries: I,
) -> EngineResult<BTreeMap<String, Decimal>>
where
    I: IntoIterator<Item = &'a AllowanceEntry>,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for entry in entries {
        if !entry.status.is_approved() {
            continue;
        }
        let total = totals
            .entry(entry.allowance_type.clone())
            .or_insert(Decimal::ZERO);
        *total = total
            .checked_add(entry.approved_amount())
            .ok_or_else(|| overflow("approved total by type"))?;
    }
    Ok(totals)
}

/// Aggregates an employee's CTC for one period.
///
/// Only entries with status `approved` contribute. Repeated types are summed,
/// never overwritten.
///
/// # Errors
///
/// `AmountOverflow` if a total leaves the decimal range.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_ctc;
/// use payroll_engine::models::{AllowanceEntry, AllowanceStatus};
/// use rust_decimal::Decimal;
///
/// let dynamic = vec![
///     AllowanceEntry { allowance_type: "site".to_string(), amount: Some(Decimal::new(100, 0)), status: AllowanceStatus::Approved },
///     AllowanceEntry { allowance_type: "site".to_string(), amount: Some(Decimal::new(50, 0)), status: AllowanceStatus::Pending },
/// ];
///
/// let result = calculate_ctc(Decimal::new(30000, 0), &dynamic, &[], 1).unwrap();
/// assert_eq!(result.approved_by_type["site"], Decimal::new(100, 0));
/// assert_eq!(result.total_ctc, Decimal::new(30100, 0));
/// ```
pub fn calculate_ctc(
    gross_salary: Decimal,
    dynamic_allowances: &[AllowanceEntry],
    fixed_allowances: &[AllowanceEntry],
    step_number: u32,
) -> EngineResult<CtcResult> {
    let dynamic_total = approved_sum(dynamic_allowances, "dynamic allowance total")?;
    let fixed_total = approved_sum(fixed_allowances, "fixed allowance total")?;
    let total_ctc = gross_salary
        .checked_add(dynamic_total)
        .and_then(|total| total.checked_add(fixed_total))
        .ok_or_else(|| overflow("total CTC"))?;

    let all_entries = || dynamic_allowances.iter().chain(fixed_allowances);
    let approved_by_type = approved_totals_by_type(all_entries())?;
    let excluded_entries = all_entries()
        .filter(|entry| !entry.status.is_approved())
        .count();

    let audit_step = AuditStep {
        step_number,
        rule_id: "ctc_aggregation".to_string(),
        rule_name: "Cost to Company".to_string(),
        formula: "gross + sum(approved dynamic) + sum(approved fixed)".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "dynamic_entries": dynamic_allowances.len(),
            "fixed_entries": fixed_allowances.len()
        }),
        output: serde_json::json!({
            "dynamic_total": dynamic_total.normalize().to_string(),
            "fixed_total": fixed_total.normalize().to_string(),
            "total_ctc": total_ctc.normalize().to_string(),
            "excluded_entries": excluded_entries
        }),
        reasoning: format!(
            "{} + {} + {} = {} ({} unapproved entries excluded)",
            gross_salary.normalize(),
            dynamic_total.normalize(),
            fixed_total.normalize(),
            total_ctc.normalize(),
            excluded_entries
        ),
    };

    Ok(CtcResult {
        gross_salary,
        dynamic_total,
        fixed_total,
        total_ctc,
        approved_by_type,
        excluded_entries,
        audit_step,
    })
}

/// Aggregates CTC from rows produced by
/// [`merge_allowance_records`](super::merge_allowance_records).
pub fn calculate_ctc_from_merged(
    gross_salary: Decimal,
    dynamic_rows: &[MergedAllowanceRow],
    fixed_rows: &[MergedAllowanceRow],
    step_number: u32,
) -> EngineResult<CtcResult> {
    let dynamic: Vec<AllowanceEntry> = dynamic_rows.iter().flat_map(|r| r.entries()).collect();
    let fixed: Vec<AllowanceEntry> = fixed_rows.iter().flat_map(|r| r.entries()).collect();
    calculate_ctc(gross_salary, &dynamic, &fixed, step_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::merge_allowance_records;
    use crate::models::{AllowanceRecord, AllowanceStatus, EmployeeCode, EmployeeRef, Month};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(allowance_type: &str, amount: Option<&str>, status: AllowanceStatus) -> AllowanceEntry {
        AllowanceEntry {
            allowance_type: allowance_type.to_string(),
            amount: amount.map(dec),
            status,
        }
    }

    #[test]
    fn test_pending_entries_do_not_count() {
        let dynamic = vec![
            entry("site", Some("100"), AllowanceStatus::Approved),
            entry("site", Some("50"), AllowanceStatus::Pending),
        ];

        let result = calculate_ctc(dec("0"), &dynamic, &[], 1).unwrap();
        assert_eq!(result.approved_by_type["site"], dec("100"));
        assert_eq!(result.dynamic_total, dec("100"));
        assert_eq!(result.excluded_entries, 1);
    }

    #[test]
    fn test_total_ctc_adds_both_lists() {
        let dynamic = vec![
            entry("site", Some("1200"), AllowanceStatus::Approved),
            entry("epfByCo", Some("1800"), AllowanceStatus::Approved),
        ];
        let fixed = vec![
            entry("bonus", Some("5000"), AllowanceStatus::Approved),
            entry("ltc", Some("3000"), AllowanceStatus::Rejected),
        ];

        let result = calculate_ctc(dec("30000"), &dynamic, &fixed, 1).unwrap();
        assert_eq!(result.dynamic_total, dec("3000"));
        assert_eq!(result.fixed_total, dec("5000"));
        assert_eq!(result.total_ctc, dec("38000"));
        assert!(!result.approved_by_type.contains_key("ltc"));
    }

    #[test]
    fn test_repeated_types_sum() {
        let dynamic = vec![
            entry("site", Some("100"), AllowanceStatus::Approved),
            entry("site", Some("100"), AllowanceStatus::Approved),
        ];
        let fixed = vec![entry("site", Some("5"), AllowanceStatus::Approved)];

        let result = calculate_ctc(dec("0"), &dynamic, &fixed, 1).unwrap();
        assert_eq!(result.approved_by_type["site"], dec("205"));
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let dynamic = vec![entry("site", None, AllowanceStatus::Approved)];
        let result = calculate_ctc(dec("1000"), &dynamic, &[], 1).unwrap();
        assert_eq!(result.total_ctc, dec("1000"));
        assert_eq!(result.approved_by_type["site"], dec("0"));
    }

    #[test]
    fn test_all_unapproved_type_is_not_listed() {
        let dynamic = vec![
            entry("site", Some("100"), AllowanceStatus::Pending),
            entry("food", Some("40"), AllowanceStatus::Approved),
        ];
        let fixed = vec![entry("site", Some("60"), AllowanceStatus::Rejected)];

        let result = calculate_ctc(dec("0"), &dynamic, &fixed, 1).unwrap();
        assert_eq!(result.approved_by_type.len(), 1);
        assert_eq!(result.approved_by_type["food"], dec("40"));
        assert_eq!(result.excluded_entries, 2);
    }

    #[test]
    fn test_oversized_amounts_report_overflow() {
        let huge = "79228162514264337593543950000";

        let dynamic = vec![entry("site", Some(huge), AllowanceStatus::Approved)];
        match calculate_ctc(dec(huge), &dynamic, &[], 1) {
            Err(EngineError::AmountOverflow { operation }) => assert_eq!(operation, "total CTC"),
            other => panic!("Expected AmountOverflow, got {:?}", other),
        }

        let dynamic = vec![
            entry("site", Some(huge), AllowanceStatus::Approved),
            entry("food", Some(huge), AllowanceStatus::Approved),
        ];
        assert!(matches!(
            calculate_ctc(dec("0"), &dynamic, &[], 1),
            Err(EngineError::AmountOverflow { .. })
        ));

        // unapproved amounts never enter a sum
        let dynamic = vec![entry("site", Some(huge), AllowanceStatus::Pending)];
        assert!(calculate_ctc(dec(huge), &dynamic, &[], 1).is_ok());
    }

    #[test]
    fn test_reasoning_lists_the_sum() {
        let dynamic = vec![entry("site", Some("100"), AllowanceStatus::Approved)];
        let fixed = vec![entry("bonus", Some("500"), AllowanceStatus::Approved)];
        let result = calculate_ctc(dec("30000"), &dynamic, &fixed, 1).unwrap();
        assert_eq!(
            result.audit_step.reasoning,
            "30000 + 100 + 500 = 30600 (0 unapproved entries excluded)"
        );
    }

    #[test]
    fn test_no_allowances() {
        let result = calculate_ctc(dec("25000.50"), &[], &[], 1).unwrap();
        assert_eq!(result.total_ctc, dec("25000.50"));
        assert!(result.approved_by_type.is_empty());
        assert_eq!(result.audit_step.output["total_ctc"], "25000.5");
    }

    #[test]
    fn test_from_merged_rows() {
        let employee = Some(EmployeeRef {
            employee_id: Some(EmployeeCode::Number(7)),
            ..Default::default()
        });
        let make = |allowance_type: &str, amount: i64, status| AllowanceRecord {
            id: None,
            employee_id: employee.clone(),
            allowance_type: allowance_type.to_string(),
            allowance_amount: Some(Decimal::new(amount, 0)),
            allowance_month: Month::June,
            allowance_year: 2024,
            status,
            voucher_no: None,
            client: None,
            project_no: None,
        };

        let dynamic = merge_allowance_records(
            &[
                make("site", 100, AllowanceStatus::Approved),
                make("site", 50, AllowanceStatus::Pending),
            ],
            1,
        );
        let fixed = merge_allowance_records(
            &[
                make("bonus", 500, AllowanceStatus::Approved),
                make("ltc", 200, AllowanceStatus::Pending),
            ],
            2,
        );

        let result = calculate_ctc_from_merged(dec("30000"), &dynamic.rows, &fixed.rows, 3).unwrap();
        assert_eq!(result.dynamic_total, dec("100"));
        assert_eq!(result.fixed_total, dec("500"));
        assert_eq!(result.total_ctc, dec("30600"));
        assert_eq!(result.excluded_entries, 2);
        assert_eq!(result.audit_step.step_number, 3);
    }
}
