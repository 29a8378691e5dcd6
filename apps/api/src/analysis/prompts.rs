// Instruction templates for the analysis flows.
// Placeholders: {resumeText}, {jobDescriptionText}, {outputSchema}.
// {outputSchema} is filled from the schema registry so the reply format and the
// validator can never disagree.

use crate::analysis::template::PromptTemplate;

pub const JOB_MATCH_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert career advisor specializing in resume optimization and job matching.
Analyze the user's resume against the job description below.

1. Extract the key skills, qualifications, and requirements from the job description.
2. Extract the relevant skills and experience from the resume.
3. Compare the two: skills required by the job that appear in the resume are matched skills;
   skills required by the job that do not appear in the resume are missing skills.
4. Calculate a match score out of 100 from the overlap and relevance of the matched skills,
   weighting the skills the job description emphasizes most.

{outputSchema}
Do not include any introductory or concluding remarks, just the JSON output.

RESUME:
{resumeText}

JOB DESCRIPTION:
{jobDescriptionText}"#,
);

pub const ATS_SCORE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert resume analyst specializing in Applicant Tracking System (ATS) compatibility.
Analyze the resume below for ATS compatibility. Give an overall score out of 100 and detailed,
actionable feedback for each of these factors:

- Keyword optimization: are relevant industry and role keywords present and used naturally?
- Formatting: is the structure clean, simple, and easy for an ATS to parse? Flag complex layouts,
  tables, graphics, and unconventional fonts.
- Achievements: are achievements quantified and impact-driven, led by action verbs?
- Section completeness: are the essential sections (contact info, summary/objective, experience,
  education, skills) present and well organized?

Keep the feedback constructive and focused on what to improve.

{outputSchema}
RESUME:
{resumeText}"#,
);

pub const OPTIMIZE_TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"You are an expert career coach and resume optimization specialist.
Analyze the resume below and offer specific, actionable suggestions that improve its quality,
impact, and Applicant Tracking System (ATS) compatibility.

1. Evaluate the resume for weak summaries, missing measurable achievements, missing keywords,
   formatting issues, and overall structure.
2. Give a readinessScore between 0 and 100. 100 means the resume needs no changes;
   0 means essential sections or content are missing entirely.
3. Write an overall summary of your feedback.
4. List specific suggestions, each with a category and, where possible, a before and after example
   quoted from or rewritten from the resume.

{outputSchema}
RESUME:
{resumeText}"#,
);
