use crate::error::Result;
use crate::models::{ReportLabel, ScenarioLabel};
use crate::store::Store;

impl Store {
    pub async fn labels_for_scenario(&self, scenario_id: i32) -> Result<Vec<ScenarioLabel>> {
        self.filter("scenario_id", &scenario_id).await
    }

    pub async fn labels_for_report(&self, report_id: i32) -> Result<Vec<ReportLabel>> {
        self.filter("report_id", &report_id).await
    }
}
