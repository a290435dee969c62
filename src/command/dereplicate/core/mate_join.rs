use log::error;

use crate::batch::Stage;
use crate::record::ReadRecord;
use crate::runtime::Result;

///////////////////////////////
/// Joins the two mates of a read pair, "<name>/1" and "<name>/2", into one read named <name>.
/// The second mate is appended back to front. Broken pairs are logged and dropped
pub struct MateJoinStage {
    pub window: Option<usize>,
}

impl Stage for MateJoinStage {
    type Input = ReadRecord;
    type Key = String;
    type Value = (String, ReadRecord);
    type Output = ReadRecord;

    fn name(&self) -> &str {
        "mate-join"
    }

    fn map(&self, read: &ReadRecord) -> Result<Vec<(String, (String, ReadRecord))>> {
        let (name, mate) = read.id().rsplit_once('/').unwrap_or((read.id(), ""));
        Ok(vec![(name.to_string(), (mate.to_string(), read.clone()))])
    }

    fn reduce(&self, name: &String, mates: &[(String, ReadRecord)]) -> Result<Vec<ReadRecord>> {
        if mates.len() != 2 {
            error!("Read pair {}: expected 2 mates, found {}", name, mates.len());
            return Ok(Vec::new());
        }

        let mut front = None;
        let mut back = None;
        for (mate, read) in mates {
            match mate.as_str() {
                "1" => front = Some(read.sequence().decode()),
                "2" => back = Some(read.sequence().decode()),
                _ => {
                    error!("Read pair {}: malformed mate suffix in id {}", name, read.id());
                    return Ok(Vec::new());
                }
            }
        }

        let (Some(front), Some(back)) = (front, back) else {
            error!("Read pair {}: needs one /1 and one /2 mate", name);
            return Ok(Vec::new());
        };
        if front.len() != back.len() {
            error!(
                "Read pair {}: mates differ in length ({} vs {})",
                name,
                front.len(),
                back.len()
            );
            return Ok(Vec::new());
        }

        let mut joined = front;
        joined.extend(back.chars().rev());
        Ok(vec![ReadRecord::with_window(name.clone(), &joined, self.window)?])
    }
}
