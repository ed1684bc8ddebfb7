//! Delete command

use anyhow::Result;

use crate::query::QueryLayer;

pub fn run(queries: &QueryLayer, activity_id: i64) -> Result<()> {
    if queries.store().delete_activity(activity_id)? {
        queries.invalidate();
        println!("Deleted activity {} and its streams", activity_id);
    } else {
        println!("Activity not found: {}", activity_id);
    }
    Ok(())
}
