//! The built-in bank of practical spreadsheet challenges.

use super::datasets::{self, Table};
use super::{Rubric, TaskDefinition};

/// Employee whose salary the lookup task asks for.
pub const LOOKUP_EMPLOYEE_ID: &str = "EMP-033";
/// Region whose revenue the sales task asks for.
pub const REVENUE_REGION: &str = "North";

pub fn builtin_tasks() -> Vec<TaskDefinition> {
    vec![
        task(
            "task_1",
            "Regional Sales Calculation",
            datasets::sales_data,
            "Using the sales data, calculate the total revenue (Units Sold * Price per Unit) \
             for the 'North' region. State the final number and show your formula or Pivot Table.",
            &["SUMPRODUCT", "SUMIF", "Pivot Table"],
            Some(regional_revenue),
        ),
        task(
            "task_2",
            "Employee Salary Lookup",
            datasets::employee_data,
            "Using the employee dataset, find the 'Salary' for 'EMP-033'. \
             State the salary and show your VLOOKUP or XLOOKUP formula.",
            &["VLOOKUP", "XLOOKUP", "INDEX/MATCH"],
            Some(employee_salary),
        ),
        task(
            "task_3",
            "Inventory Summary",
            datasets::messy_inventory_data,
            "The inventory data has duplicates. Remove rows with duplicate 'ItemID's, then \
             create a Pivot Table showing the total 'StockLevel' for each 'ItemName'. \
             Show your final Pivot Table.",
            &["Remove Duplicates", "Pivot Table", "Data Aggregation"],
            None,
        ),
        task(
            "task_4",
            "Assign Student Grades",
            datasets::student_scores,
            "Create a new 'Grade' column. Use an IF statement to assign 'Pass' if the 'Score' \
             is 60 or greater, and 'Fail' otherwise. Show the formula for one cell.",
            &["IF function", "Conditional Logic"],
            None,
        ),
        task(
            "task_5",
            "Create Full Names",
            datasets::contact_list,
            "Create a 'FullName' column by combining 'FirstName' and 'LastName' with a space \
             in between. Show your CONCAT or ampersand (&) formula.",
            &["CONCAT", "Ampersand (&)", "Text Manipulation"],
            None,
        ),
        task(
            "task_6",
            "Highlight High Scores",
            datasets::student_scores,
            "Apply Conditional Formatting to highlight all scores greater than 90 with a green \
             fill. Show the formatted column and the rule you created.",
            &["Conditional Formatting", "Highlight Cells Rules"],
            None,
        ),
        task(
            "task_7",
            "Filter Completed Projects",
            datasets::project_data,
            "Use the FILTER function to create a new table on the same sheet that contains all \
             projects with a 'Status' of 'Completed'. Show your FILTER formula.",
            &["FILTER function", "Dynamic Arrays"],
            None,
        ),
        task(
            "task_8",
            "Create a Sales Chart",
            datasets::sales_data,
            "Create a Bar Chart that shows the total 'Units Sold' for each 'Product'. \
             Give the chart a title. Show your final chart.",
            &["Charting", "Data Visualization", "PivotChart"],
            None,
        ),
        task(
            "task_9",
            "Clean Numeric Data",
            datasets::order_data,
            "The 'Price' column is formatted as text (e.g., '$ 1.50'). Create a 'CleanPrice' \
             column that converts this to a proper number. Show your formula.",
            &["SUBSTITUTE", "VALUE", "TRIM", "Text to Number"],
            None,
        ),
        task(
            "task_10",
            "Data Validation Dropdown",
            datasets::project_data,
            "Add a new 'Verification' column. Use Data Validation to create a dropdown list \
             with the options: 'Verified', 'Pending', 'Rejected'. Show the dropdown arrow in a cell.",
            &["Data Validation", "Dropdown List"],
            None,
        ),
    ]
}

fn task(
    id: &str,
    title: &str,
    dataset: datasets::DatasetGenerator,
    prompt: &str,
    key_concepts: &[&str],
    reference_answer: Option<super::ReferenceAnswer>,
) -> TaskDefinition {
    TaskDefinition {
        id: id.to_string(),
        title: title.to_string(),
        prompt: prompt.to_string(),
        rubric: Rubric::new(key_concepts.iter().copied()),
        dataset,
        reference_answer,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reference answers
// ────────────────────────────────────────────────────────────────────────────

/// Σ(Units Sold × Price per Unit) over rows in the revenue region.
fn regional_revenue(table: &Table) -> Option<f64> {
    let region = table.column("Region")?;
    let units = table.column("Units Sold")?;
    let price = table.column("Price per Unit")?;

    let mut total = 0.0;
    for row in table.rows.iter().filter(|r| r[region] == REVENUE_REGION) {
        let units: f64 = row[units].parse().ok()?;
        let price: f64 = row[price].parse().ok()?;
        total += units * price;
    }
    Some(total)
}

fn employee_salary(table: &Table) -> Option<f64> {
    let id = table.column("Employee ID")?;
    let salary = table.column("Salary")?;
    table
        .rows
        .iter()
        .find(|r| r[id] == LOOKUP_EMPLOYEE_ID)
        .and_then(|r| r[salary].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales(rows: &[(&str, u32, u32)]) -> Table {
        let mut table = Table::new(vec![
            "Date",
            "Region",
            "Product",
            "Units Sold",
            "Price per Unit",
        ]);
        for (region, units, price) in rows {
            table.push(vec![
                "2025-01-01".to_string(),
                region.to_string(),
                "Mouse".to_string(),
                units.to_string(),
                price.to_string(),
            ]);
        }
        table
    }

    #[test]
    fn test_regional_revenue_sums_only_north() {
        let table = sales(&[("North", 10, 1000), ("South", 5, 900), ("North", 2, 800)]);
        assert_eq!(regional_revenue(&table), Some(11_600.0));
    }

    #[test]
    fn test_regional_revenue_zero_without_north_rows() {
        let table = sales(&[("East", 10, 1000)]);
        assert_eq!(regional_revenue(&table), Some(0.0));
    }

    #[test]
    fn test_employee_salary_finds_lookup_target() {
        let mut table = Table::new(vec!["Employee ID", "Department", "Salary"]);
        table.push(vec!["EMP-032".into(), "HR".into(), "60000".into()]);
        table.push(vec!["EMP-033".into(), "Sales".into(), "71234".into()]);
        assert_eq!(employee_salary(&table), Some(71_234.0));
    }

    #[test]
    fn test_reference_answers_work_on_generated_data() {
        assert!(regional_revenue(&datasets::sales_data()).is_some());
        assert!(employee_salary(&datasets::employee_data()).is_some());
    }

    #[test]
    fn test_reference_answer_missing_column_is_none() {
        let table = Table::new(vec!["StudentID", "Score"]);
        assert_eq!(regional_revenue(&table), None);
        assert_eq!(employee_salary(&table), None);
    }
}
