// Built-in skill dictionaries. Terms are lower-case; duplicates are collapsed by the
// taxonomy builder (first category wins).

use super::SkillCategory;

pub const TECHNICAL: &[&str] = &[
    // languages & scripting
    "python", "java", "c++", "c#", "javascript", "typescript", "php", "ruby", "go", "swift",
    "kotlin", "rust", "sql", "pl/sql", "bash", "powershell", "linux shell scripting", "html",
    "css", "r", "perl", "scala", "haskell", "matlab", "fortran", "cobol", "delphi", "assembly",
    "objective-c", "dart", "groovy", "f#", "lua", "elixir", "erlang", "clojure", "scheme", "vba",
    "apex", "solidity", "coffeescript", "less", "sass", "jsx", "tsx",
    // frontend
    "react", "angular", "vue.js", "next.js", "node.js", "express", "jquery", "bootstrap",
    "tailwind css", "material-ui", "ant design", "redux", "mobx", "context api", "webpack",
    "babel", "parcel", "grunt", "gulp", "pwa", "spa", "responsive design", "web accessibility",
    "seo", "pug", "handlebars.js", "svelte", "ember.js", "webassembly", "html5", "css3", "webgl",
    // backend & frameworks
    "django", "flask", "ruby on rails", "asp.net", "spring boot", "laravel", "symfony",
    "cakephp", "phalcon", "gin", "fiber", "nestjs", "fastapi", "graphql", "rest api",
    "microservices", "nginx", "apache http server", "iis", "tomcat", "jetty", "weblogic",
    "websphere", "grpc", "message queues", "rabbitmq", "apache kafka",
    // databases & data management
    "mysql", "postgresql", "mongodb", "redis", "microsoft sql server", "oracle", "sqlite",
    "cassandra", "couchbase", "dynamodb", "neo4j", "elasticsearch", "solr", "hbase", "teradata",
    "db2", "snowflake", "bigquery", "redshift", "data warehousing", "etl", "data modeling",
    "database administration", "sql optimization", "nosql", "in-memory databases",
    "time-series databases", "graph databases", "columnar databases", "data lakes", "lakehouse",
    "data governance", "data quality",
    // cloud & devops
    "aws", "amazon web services", "azure", "google cloud", "gcp", "docker", "kubernetes",
    "terraform", "ansible", "jenkins", "git", "github", "gitlab", "ci/cd", "ec2", "s3", "lambda",
    "rds", "iam", "vpc", "cloudformation", "cloudwatch", "ebs", "efs", "ecs", "eks", "fargate",
    "cloudtrail", "route 53", "api gateway", "sns", "sqs", "step functions", "azure devops",
    "azure functions", "azure virtual machines", "google kubernetes engine",
    "google cloud functions", "google app engine", "serverless", "containerization", "helm",
    "prometheus", "grafana", "splunk", "logstash", "kibana", "packer", "vagrant", "chef",
    "puppet", "datadog", "new relic", "nagios", "zabbix", "mulesoft", "api management",
    // data science, ml & ai
    "pandas", "numpy", "scikit-learn", "tensorflow", "pytorch", "keras", "matplotlib", "seaborn",
    "nltk", "opencv", "power bi", "tableau", "spark", "hadoop", "databricks", "mlflow", "jupyter",
    "zeppelin", "scipy", "statsmodels", "xgboost", "lightgbm", "catboost", "dask", "airflow",
    "kubeflow", "aws sagemaker", "azure ml", "google ai platform", "machine learning",
    "deep learning", "natural language processing", "nlp", "computer vision",
    "reinforcement learning", "artificial intelligence", "data analysis", "data visualization",
    "big data", "predictive analytics", "statistical modeling", "time series analysis",
    "feature engineering", "model deployment", "model monitoring", "mlops", "data engineering",
    "vector databases",
    // operating systems & virtualization
    "linux", "windows server", "macos", "ubuntu", "centos", "red hat", "debian", "unix", "vmware",
    "hyper-v", "virtualbox", "kvm", "xen", "vmware vsphere",
    // security & networking
    "network security", "firewalls", "intrusion detection systems", "vpn", "encryption",
    "penetration testing", "ethical hacking", "vulnerability assessment", "security audits",
    "gdpr", "hipaa", "iso 27001", "network protocols", "tcp/ip", "dns", "dhcp", "routing",
    "switching", "wireshark", "snort", "nmap", "kali linux", "endpoint security",
    "identity and access management",
    // project management & methodologies
    "agile", "scrum", "kanban", "jira", "confluence", "trello", "asana", "microsoft project",
    "devsecops", "waterfall", "sdlc",
    // testing & qa
    "unit testing", "integration testing", "e2e testing", "regression testing",
    "performance testing", "load testing", "selenium", "cypress", "jest", "pytest", "jmeter",
    "test automation", "bug tracking",
    // enterprise software
    "salesforce", "sap", "oracle erp", "microsoft dynamics", "servicenow", "zendesk", "hubspot",
    "sharepoint", "active directory",
    // design
    "figma", "sketch", "adobe xd", "photoshop", "illustrator", "invision", "zeplin",
    "wireframing", "prototyping", "user research", "usability testing",
    "information architecture", "design systems",
    // big data
    "apache spark", "apache hadoop", "apache hive", "apache flink", "apache storm",
    "data streaming", "google dataflow", "azure databricks",
    // misc
    "microsoft excel", "google sheets", "scripting", "technical support", "system administration",
    "technical writing", "documentation", "api design", "sdk development", "blockchain",
    "smart contracts",
];

pub const NON_TECHNICAL: &[&str] = &[
    "communication", "verbal communication", "written communication", "presentation skills",
    "public speaking", "teamwork", "collaboration", "leadership", "mentoring", "team management",
    "project management", "problem solving", "critical thinking", "analytical skills",
    "troubleshooting", "debugging", "time management", "adaptability", "creativity", "work ethic",
    "attention to detail", "customer service", "negotiation", "decision making",
];

pub const LANGUAGES: &[&str] = &[
    "english", "mandarin", "chinese", "hindi", "spanish", "french", "arabic", "bengali",
    "russian", "portuguese", "urdu", "indonesian", "german", "japanese", "swahili", "marathi",
    "telugu", "turkish", "tamil", "vietnamese", "korean", "italian", "thai", "gujarati",
    "persian", "polish", "pashto", "kannada", "malayalam", "dutch",
];

/// `(pattern, canonical skill, category)`; matched before plain terms and claim their spans.
pub const COMPOUNDS: &[(&str, &str, SkillCategory)] = &[
    (r"react\.js|reactjs", "react", SkillCategory::Technical),
    (r"node\.js|nodejs", "node.js", SkillCategory::Technical),
];
