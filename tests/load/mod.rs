mod concurrent_enrollment;
