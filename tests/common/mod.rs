use std::fs;
use std::path::Path;

use coronaboard::SourcePaths;


pub static REPORTS: &'static str = "\
country,date,total_cases,total_deaths,total_cases_with_travel_history_to_china,total_cases_with_transmission_outside_china,total_cases_with_transmission_site_under_investigation
China,2020-01-01,0,0,0,0,0
China,2020-01-02,0,0,0,0,0
China,2020-01-03,5,0,0,0,0
China,2020-01-04,5,1,0,0,0
China,2020-01-05,8,1,0,0,0
Japan,2020-01-04,2,0,2,0,0
Japan,2020-01-05,4,0,3,1,0
Atlantis,2020-01-05,3,0,0,3,0
";

pub static COORDINATES: &'static str = "\
country,region,continent,lat,long
China,Eastern Asia,Asia,35.86,104.19
Japan,Eastern Asia,Asia,36.20,138.25
";

pub static RISK: &'static str = "\
location,risk_assesment
china,very high
globally,high
outside_of_china,high
china,very high
globally,very high
outside_of_china,high
";

pub static LABS: &'static str = "\
country,num_of_labs
Japan,12
";

pub fn write_fixtures(dir: &Path) -> SourcePaths {
	let paths = SourcePaths::in_dir(dir);
	fs::write(&paths.reports, REPORTS).unwrap();
	fs::write(&paths.coordinates, COORDINATES).unwrap();
	fs::write(&paths.risk_assessment, RISK).unwrap();
	fs::write(&paths.testing_laboratories, LABS).unwrap();
	paths
}
