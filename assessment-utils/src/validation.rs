use question_bank::NewAssessmentType;

use crate::error::Error;

/// Parses the `assessment_type_id` query parameter into a positive integer.
pub fn parse_assessment_type_id(param: Option<&str>) -> Result<i64, Error> {
    let Some(param) = param.map(str::trim).filter(|p| !p.is_empty()) else {
        return Err(Error::MissingAssessmentType);
    };

    match param.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidAssessmentType(param.to_string())),
    }
}

/// Parses the `org_id` query parameter.
pub fn parse_org_id(param: Option<&str>) -> Result<i64, Error> {
    let Some(param) = param.map(str::trim).filter(|p| !p.is_empty()) else {
        return Err(Error::MissingOrganization);
    };

    param
        .parse::<i64>()
        .map_err(|_| Error::InvalidOrganization(param.to_string()))
}

pub fn validate_new_assessment_type(new_assessment_type: &NewAssessmentType) -> Result<(), Error> {
    if new_assessment_type.name.trim().is_empty() {
        return Err(Error::MissingName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_type_id_must_be_present() {
        assert!(matches!(
            parse_assessment_type_id(None),
            Err(Error::MissingAssessmentType)
        ));
        assert!(matches!(
            parse_assessment_type_id(Some("  ")),
            Err(Error::MissingAssessmentType)
        ));
    }

    #[test]
    fn assessment_type_id_must_be_a_positive_integer() {
        assert_eq!(parse_assessment_type_id(Some("2")).unwrap(), 2);
        assert_eq!(parse_assessment_type_id(Some(" 14 ")).unwrap(), 14);
        for bad in ["abc", "1.5", "12abc", "0", "-3"] {
            let err = parse_assessment_type_id(Some(bad)).unwrap_err();
            assert!(matches!(err, Error::InvalidAssessmentType(_)), "{bad}");
            assert!(err.is_validation());
        }
    }

    #[test]
    fn org_id_is_required() {
        assert!(matches!(parse_org_id(None), Err(Error::MissingOrganization)));
        assert!(matches!(
            parse_org_id(Some("acme")),
            Err(Error::InvalidOrganization(_))
        ));
        assert_eq!(parse_org_id(Some("1")).unwrap(), 1);
    }

    #[test]
    fn blank_name_is_rejected() {
        let new_assessment_type = NewAssessmentType {
            name: "   ".to_string(),
            description: None,
            key_area_id: None,
            is_active: true,
        };
        let err = validate_new_assessment_type(&new_assessment_type).unwrap_err();
        assert_eq!(err.to_string(), "Assessment type name is required");
    }
}
